use fractal_terrain::{FaultParams, LogisticMap, SourceKind, Terrain};

fn main() {
    // 256x256 tile, 512 faults from a pinned logistic map so the run repeats
    let mut terrain = Terrain::with_chaos(256, LogisticMap::new(4.0, 0.2025));
    let params = FaultParams {
        source: SourceKind::Chaotic,
        ..FaultParams::default()
    };
    terrain.generate(params, |_| {}).unwrap();
    terrain.smooth(1);

    // Print the top-left 16x16 corner of the tile
    for y in 0..16 {
        for x in 0..16 {
            print!("{:>4} ", terrain.grid().get(x, y));
        }
        println!();
    }

    println!(
        "Fractal dimension: {:.3}",
        terrain.fractal_dimension().unwrap()
    );
}
