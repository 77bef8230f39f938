use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate};
use serde::Serialize;

/// One row of the synthetic policyholder table, in source column order.
#[derive(Serialize)]
#[serde(rename_all = "PascalCase")]
struct PolicyholderRow {
    #[serde(rename = "Customer_ID")]
    customer_id: String,
    age: u32,
    gender: &'static str,
    region: &'static str,
    occupation: &'static str,
    #[serde(rename = "Monthly_Income")]
    monthly_income: f64,
    #[serde(rename = "Wallet_Balance")]
    wallet_balance: f64,
    #[serde(rename = "Policy_Type")]
    policy_type: &'static str,
    #[serde(rename = "Policy_Start_Date")]
    policy_start_date: String,
    #[serde(rename = "Policy_End_Date")]
    policy_end_date: String,
    #[serde(rename = "Total_Claims")]
    total_claims: u32,
    #[serde(rename = "Denied_Claims")]
    denied_claims: u32,
    #[serde(rename = "Last_Claim_Date")]
    last_claim_date: String,
    renewed: u8,
    #[serde(rename = "Dropout_Flag")]
    dropout_flag: u8,
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

    /// Uniform integer in `lo..=hi`.
    fn range(&mut self, lo: u32, hi: u32) -> u32 {
        lo + (self.next_f64() * (hi - lo + 1) as f64) as u32
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[(self.next_f64() * items.len() as f64) as usize % items.len()]
    }

    fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

const ROWS: usize = 500;

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    let regions = [
        "North Central",
        "North East",
        "North West",
        "South East",
        "South South",
        "South West",
    ];
    let genders = ["Male", "Female"];
    let occupations = ["Trader", "Farmer", "Artisan", "Driver", "Teacher", "Tailor"];
    let policy_types = ["Health", "Life", "Crop", "Device"];
    let epoch = NaiveDate::from_ymd_opt(2021, 1, 1).context("invalid epoch date")?;

    let output_path = "sample_policyholders.csv";
    let mut writer = csv::Writer::from_path(output_path).context("creating output file")?;

    for i in 0..ROWS {
        let start = epoch + Duration::days(rng.range(0, 730) as i64);
        let end = start + Duration::days(365);
        let total_claims = rng.range(0, 6);
        let denied_claims = if total_claims == 0 { 0 } else { rng.range(0, total_claims) };

        // A few malformed claim dates exercise the loader's coercion path.
        let last_claim_date = if total_claims == 0 {
            String::new()
        } else if rng.chance(0.02) {
            "unknown".to_string()
        } else {
            let offset = rng.range(0, 364) as i64;
            (start + Duration::days(offset)).format("%Y-%m-%d").to_string()
        };

        let monthly_income = rng.gauss(55_000.0, 20_000.0).max(5_000.0).round();
        let dropout = rng.chance(0.15 + 0.05 * denied_claims as f64);

        writer
            .serialize(PolicyholderRow {
                customer_id: format!("CUST{:05}", i + 1),
                age: rng.range(18, 70),
                gender: rng.pick(&genders),
                region: rng.pick(&regions),
                occupation: rng.pick(&occupations),
                monthly_income,
                wallet_balance: (monthly_income * rng.next_f64() * 0.3).round(),
                policy_type: rng.pick(&policy_types),
                policy_start_date: start.format("%Y-%m-%d").to_string(),
                policy_end_date: end.format("%Y-%m-%d").to_string(),
                total_claims,
                denied_claims,
                last_claim_date,
                renewed: u8::from(!dropout && rng.chance(0.8)),
                dropout_flag: u8::from(dropout),
            })
            .with_context(|| format!("writing row {i}"))?;
    }

    writer.flush().context("flushing output file")?;
    println!("Wrote {ROWS} policyholders to {output_path}");
    Ok(())
}
