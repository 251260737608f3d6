use std::path::{Path, PathBuf};

use rust_xlsxwriter::Workbook;

/// EC target per school, mirroring the dashboard's assignment table.
const SCHOOLS: [(&str, f64); 4] = [
    ("송도고", 1.0),
    ("하늘고", 2.0),
    ("아라고", 4.0),
    ("동산고", 8.0),
];

const DAYS: u32 = 14;
const PLANTS_PER_SCHOOL: u32 = 30;

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

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

fn main() {
    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("data"));
    std::fs::create_dir_all(&dir).expect("Failed to create output directory");

    let mut rng = SimpleRng::new(42);

    for (school, target_ec) in SCHOOLS {
        write_environment_csv(&dir, school, target_ec, &mut rng);
    }
    write_growth_workbook(&dir.join("4개교_생육결과데이터.xlsx"), &mut rng);

    println!(
        "Wrote {} environment logs and the growth workbook to {}",
        SCHOOLS.len(),
        dir.display()
    );
}

/// Hourly sensor rows over the trial window: diurnal temperature and
/// humidity cycles, a slow pH drift, and measured EC tracking the target.
fn write_environment_csv(dir: &Path, school: &str, target_ec: f64, rng: &mut SimpleRng) {
    let path = dir.join(format!("{school}_환경데이터.csv"));
    let mut writer = csv::Writer::from_path(&path).expect("Failed to create CSV file");
    writer
        .write_record(["time", "temperature", "humidity", "ph", "ec"])
        .expect("Failed to write CSV header");

    for day in 1..=DAYS {
        for hour in 0..24u32 {
            let t = hour as f64;
            let temperature = 21.0
                + 2.5 * ((t - 9.0) / 24.0 * std::f64::consts::TAU).sin()
                + rng.gauss(0.0, 0.4);
            let humidity = (62.0 - 8.0 * ((t - 12.0) / 24.0 * std::f64::consts::TAU).sin()
                + rng.gauss(0.0, 2.0))
            .clamp(30.0, 95.0);
            let ph = 5.8
                + 0.15 * (day as f64 / DAYS as f64 * std::f64::consts::TAU).sin()
                + rng.gauss(0.0, 0.05);
            let ec = (target_ec + rng.gauss(0.0, 0.06 * target_ec)).max(0.1);

            writer
                .write_record([
                    format!("2024-11-{day:02} {hour:02}:00"),
                    format!("{temperature:.1}"),
                    format!("{humidity:.1}"),
                    format!("{ph:.2}"),
                    format!("{ec:.2}"),
                ])
                .expect("Failed to write CSV row");
        }
    }
    writer.flush().expect("Failed to flush CSV file");
    println!("  {} ({} rows)", path.display(), DAYS * 24);
}

/// Mean fresh weight peaks near EC 2.0 and falls off on a log scale either
/// side, the dose-response shape the real trial showed.
fn mean_weight(ec: f64) -> f64 {
    24.0 * (-((ec.ln() - 2.0_f64.ln()).powi(2)) / 0.9).exp()
}

fn write_growth_workbook(path: &Path, rng: &mut SimpleRng) {
    let mut workbook = Workbook::new();

    for (school, target_ec) in SCHOOLS {
        let sheet = workbook.add_worksheet();
        sheet.set_name(school).expect("Failed to name sheet");
        sheet.write_string(0, 0, "개체번호").expect("Failed to write header");
        sheet.write_string(0, 1, "생중량(g)").expect("Failed to write header");
        sheet.write_string(0, 2, "잎 수(장)").expect("Failed to write header");
        sheet
            .write_string(0, 3, "지상부 길이(mm)")
            .expect("Failed to write header");

        let base = mean_weight(target_ec);
        for plant in 0..PLANTS_PER_SCHOOL {
            let weight = (base + rng.gauss(0.0, 2.2)).max(0.5);
            let leaves = (4.0 + weight * 0.35 + rng.gauss(0.0, 1.0)).round().max(1.0);
            let shoot = (40.0 + weight * 3.2 + rng.gauss(0.0, 6.0)).max(5.0);

            let row = plant + 1;
            sheet
                .write_number(row, 0, (plant + 1) as f64)
                .expect("Failed to write cell");
            sheet
                .write_number(row, 1, (weight * 10.0).round() / 10.0)
                .expect("Failed to write cell");
            sheet.write_number(row, 2, leaves).expect("Failed to write cell");
            sheet
                .write_number(row, 3, (shoot * 10.0).round() / 10.0)
                .expect("Failed to write cell");
        }
    }

    workbook.save(path).expect("Failed to save workbook");
    println!(
        "  {} ({} sheets, {} plants each)",
        path.display(),
        SCHOOLS.len(),
        PLANTS_PER_SCHOOL
    );
}
