use anyhow::Result;
use depit::{DepitParams, LogMonitor, depit};
use ndarray::{Array2, array};

fn main() -> Result<()> {
    let nd: f64 = -100.0;
    let resx: f64 = 8.0;
    let resy: f64 = 8.0;
    let params = DepitParams::default();

    let mut dem: Array2<f64> = array![
        [3.0, 3.0, 3.0, 7.0],
        [3.0, 2.0, 4.0, 2.0],
        [5.0, 6.0, 8.0, 0.0],
    ];
    println!("Depitting {dem}");
    let mut monitor = LogMonitor::new();
    let outcome = depit(&mut dem, nd, resx, resy, &params, &mut monitor)?;
    println!("now is {dem}");
    println!("stats {:?}", outcome.stats());

    let mut dem: Array2<f64> = array![
        [10.0, 10.0, 10.0, 10.0, 10.0],
        [10.0, 8.0, 8.0, 8.0, 10.0],
        [10.0, 8.0, 5.0, 8.0, 10.0],
        [10.0, 8.0, 8.0, 8.0, 10.0],
        [10.0, 10.0, 9.0, 10.0, 10.0],
    ];
    println!("Depitting {dem}");
    if let Some(depitted) = depit(&mut dem, nd, resx, resy, &params, &mut monitor)?.complete() {
        println!("now is {dem}");
        println!("flow directions {}", depitted.flow);
        println!("depression cells {}", depitted.pits.mapv(u8::from));
    }

    Ok(())
}
