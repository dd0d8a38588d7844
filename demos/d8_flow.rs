use anyhow::Result;
use depit::{d8_flow_directions, downstream};
use ndarray::{Array2, array};

fn main() -> Result<()> {
    let nd: f64 = -100.0;
    let dem: Array2<f64> = array![
        [9.0, 9.0, 9.0, 9.0, 9.0],
        [9.0, 7.0, 6.0, 5.0, 9.0],
        [9.0, 6.0, 4.0, 3.0, 9.0],
        [9.0, 5.0, 3.0, 2.0, 1.0],
        [9.0, 9.0, 9.0, 9.0, 9.0],
    ];
    let (flow, flow_nd) = d8_flow_directions(&dem, nd, 10.0, 10.0)?;
    println!("D8 of {dem}");
    println!("is {flow} (no-data {flow_nd})");

    let (mut row, mut col) = (1, 1);
    print!("path from ({row}, {col})");
    while let Some(next) = downstream(&flow, row, col) {
        (row, col) = next;
        print!(" -> ({row}, {col})");
    }
    println!();

    Ok(())
}
