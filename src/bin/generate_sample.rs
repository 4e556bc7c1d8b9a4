//! Writes synthetic reduction benchmark logs (`sample_size.log`,
//! `sample_range.log`) in the format the `ddot-*` presets read.

use std::fmt::Write as _;
use std::path::PathBuf;

/// (Alg, NbFPE, relative cost against the plain parallel reduction)
const VARIANTS: &[(u32, Option<u32>, f64)] = &[
    (0, None, 1.0),
    (1, None, 6.0),
    (2, Some(2), 1.6),
    (2, Some(3), 1.9),
    (2, Some(4), 2.3),
    (2, Some(8), 3.4),
    (3, Some(8), 2.1),
    (4, Some(4), 1.8),
    (5, Some(6), 2.0),
];

/// Sustained throughput (GB/s) of the plain reduction on a large array.
const PEAK_GBS: f64 = 180.0;

/// Throughput ramps up with array size until launch overhead is amortised.
/// Wide dynamic ranges hurt the expansions, which fall back to the
/// accumulator more often.
fn throughput(n: u64, range: u32, nbfpe: Option<u32>, cost: f64) -> f64 {
    let ramp = n as f64 / (n as f64 + 2.0e6);
    let spill = match nbfpe {
        Some(k) => 1.0 + (range as f64 / (400.0 * k as f64)).min(2.0),
        None => 1.0,
    };
    PEAK_GBS * ramp / (cost * spill)
}

fn write_run(out: &mut String, alg: u32, nbfpe: Option<u32>, range: u32, n: u64, gbs: f64) {
    let bytes = n * std::mem::size_of::<f64>() as u64;
    let time = bytes as f64 * 1e-9 / gbs;
    let fpe = nbfpe.map(|k| format!("NbFPE = {k} \t ")).unwrap_or_default();
    let head = format!("Alg = {alg} \t {fpe}Range = {range} \t NbElements = {n} \t Size = {bytes} \t Time = {time:.8} s");
    let gflops = n as f64 * 1e-9 / time;

    writeln!(out, "{head} \t Throughput = {:.4} GB/s\n", gbs * 8.0).unwrap();
    writeln!(out, "{head} \t Performance = {gflops:.4} GFLOPS\n").unwrap();
}

fn main() {
    let out_dir = std::env::args().nth(1).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));

    let mut size_log = String::new();
    for &(alg, nbfpe, cost) in VARIANTS {
        let mut n: u64 = 1000;
        while n <= 1_000_000_000 {
            write_run(&mut size_log, alg, nbfpe, 3, n, throughput(n, 3, nbfpe, cost));
            n *= 4;
        }
    }

    let mut range_log = String::new();
    let n: u64 = 33_554_432;
    for range in (0..=500).step_by(50) {
        for &(alg, nbfpe, cost) in VARIANTS {
            write_run(&mut range_log, alg, nbfpe, range, n, throughput(n, range, nbfpe, cost));
        }
    }

    for (name, text) in [("sample_size.log", &size_log), ("sample_range.log", &range_log)] {
        let path = out_dir.join(name);
        std::fs::write(&path, text).expect("Failed to write sample log");
        println!("Wrote {} lines to {}", text.lines().filter(|l| !l.is_empty()).count(), path.display());
    }
}
