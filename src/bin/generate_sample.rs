use std::collections::BTreeMap;
use std::path::PathBuf;

use chrono::{Duration, NaiveDate};
use clap::Parser;

/// Write sample forecast, allocation and fabric CSV files.
#[derive(Parser, Debug)]
struct Args {
    /// Output directory
    #[arg(short, long, default_value = "prediction_data")]
    out: PathBuf,

    /// Number of forecast days
    #[arg(long, default_value_t = 30)]
    days: i64,

    /// PRNG seed
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() {
    let args = Args::parse();
    let mut rng = SimpleRng::new(args.seed);

    let start = NaiveDate::from_ymd_opt(2025, 7, 1).expect("valid start date");

    // (SKU, fabric type, metres of fabric per unit, base daily demand)
    let skus = [
        ("KURTA-001", "Cotton", 2.4, 40.0),
        ("KURTA-002", "Cotton", 2.5, 28.0),
        ("PALAZZO-010", "Rayon", 2.1, 35.0),
        ("PALAZZO-011", "Rayon", 2.0, 18.0),
        ("DRESS-020", "Linen", 3.2, 12.0),
        ("SHIRT-030", "Cotton", 1.8, 22.0),
        ("TROUSER-040", "Linen", 1.6, 15.0),
        ("SKIRT-050", "Georgette", 2.2, 9.0),
    ];
    let vendors = ["Vendor_A", "Vendor_B", "Vendor_C", "Vendor_D", "Vendor_E"];

    std::fs::create_dir_all(&args.out).expect("Failed to create output directory");

    // ---- Forecast: one row per SKU per day ----
    let forecast_path = args.out.join("next_30_day_forecast.csv");
    let mut forecast = csv::Writer::from_path(&forecast_path).expect("Failed to create forecast file");
    forecast
        .write_record(["SKU", "Date", "Forecast_Units"])
        .expect("Failed to write header");
    let mut demand: BTreeMap<&str, f64> = BTreeMap::new();
    for &(sku, _, _, base) in &skus {
        for day in 0..args.days {
            let weekly = 1.0 + 0.25 * ((day as f64) * std::f64::consts::TAU / 7.0).sin();
            let units = (base * weekly + rng.gauss(0.0, base * 0.1)).max(0.0);
            let units = (units * 100.0).round() / 100.0;
            *demand.entry(sku).or_default() += units;
            let date = start + Duration::days(day);
            forecast
                .write_record([sku.to_string(), date.format("%Y-%m-%d").to_string(), units.to_string()])
                .expect("Failed to write forecast row");
        }
    }
    forecast.flush().expect("Failed to flush forecast file");

    // ---- Allocation: each SKU split over one or two vendors ----
    let allocation_path = args.out.join("final_allocation.csv");
    let mut allocation =
        csv::Writer::from_path(&allocation_path).expect("Failed to create allocation file");
    allocation
        .write_record(["Unnamed: 0", "SKU", "Vendor", "Allocated_Qty", "MOQ", "Max_Supply"])
        .expect("Failed to write header");

    // (vendor, fabric type) → (SKUs, fabric metres, units)
    let mut fabric: BTreeMap<(&str, &str), (Vec<&str>, f64, u64)> = BTreeMap::new();
    let mut row_id = 0;
    for &(sku, fabric_type, metres_per_unit, _) in &skus {
        let total = demand[sku].ceil() as u64;
        let first = rng.below(vendors.len());
        let split = if rng.next_f64() < 0.5 { 1 } else { 2 };
        for part in 0..split {
            let vendor = vendors[(first + part * 2) % vendors.len()];
            let qty = if split == 1 { total } else if part == 0 { total * 6 / 10 } else { total - total * 6 / 10 };
            let moq = 50 * (1 + rng.below(4) as u64);
            let max_supply = qty + 100 * (1 + rng.below(10) as u64);
            allocation
                .write_record([
                    row_id.to_string(),
                    sku.to_string(),
                    vendor.to_string(),
                    qty.to_string(),
                    moq.to_string(),
                    max_supply.to_string(),
                ])
                .expect("Failed to write allocation row");
            row_id += 1;

            let entry = fabric.entry((vendor, fabric_type)).or_default();
            entry.0.push(sku);
            entry.1 += qty as f64 * metres_per_unit;
            entry.2 += qty;
        }
    }
    allocation.flush().expect("Failed to flush allocation file");

    // ---- Fabric summary: one row per vendor and fabric type ----
    let fabric_path = args.out.join("filtered_fabric_summary.csv");
    let mut summary = csv::Writer::from_path(&fabric_path).expect("Failed to create fabric file");
    summary
        .write_record(["Unnamed: 0", "Vendor", "SKUs", "Fabric_Type", "Total_Fabric_Required", "Total_Units"])
        .expect("Failed to write header");
    for (i, ((vendor, fabric_type), (sku_list, metres, units))) in fabric.iter().enumerate() {
        summary
            .write_record([
                i.to_string(),
                vendor.to_string(),
                sku_list.join(", "),
                fabric_type.to_string(),
                format!("{metres:.2}"),
                units.to_string(),
            ])
            .expect("Failed to write fabric row");
    }
    summary.flush().expect("Failed to flush fabric file");

    println!(
        "Wrote {} SKUs x {} days, {} allocations and {} fabric rows to {}",
        skus.len(),
        args.days,
        row_id,
        fabric.len(),
        args.out.display()
    );
}
