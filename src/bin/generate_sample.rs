//! Writes synthetic disciplinary-action datasets matching the default
//! registry: `data/data{1,2,3}_utf8.csv`, UTF-8 with a BOM.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};

const OUTPUT_DIR: &str = "data";

const POSTS: &[&str] = &["自衛官", "事務官等", "技官", "教官", "防衛大学校学生"];
const PENALTIES: &[&str] = &["免職", "停職", "減給", "戒告"];
const CAUSES: &[&str] = &[
    "服務規律違反",
    "ハラスメント",
    "交通法規違反",
    "金銭関係",
    "情報管理",
    "薬物",
];
const ACTS: &[&str] = &[
    "無断欠勤",
    "暴行",
    "パワー・ハラスメント",
    "セクシュアル・ハラスメント",
    "酒気帯び運転",
    "窃盗",
    "詐欺",
    "秘密漏えい",
    "虚偽報告",
    "私的流用",
];
const CONTEXTS: &[&str] = &["勤務中", "勤務時間外", "営内"];

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

    /// Uniform in `0..bound`.
    fn below(&mut self, bound: u64) -> u64 {
        self.next_u64() % bound
    }

    fn pick<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.below(items.len() as u64) as usize]
    }
}

/// Count rows by key, keeping the key order stable for reproducible files.
fn tally<K: Ord>(keys: impl IntoIterator<Item = K>) -> BTreeMap<K, u64> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

fn write_csv(path: &Path, header: &[&str], rows: &[Vec<String>]) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    // Spreadsheet-friendly BOM.
    file.write_all("\u{feff}".as_bytes())?;

    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    println!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(2023);
    let dir = Path::new(OUTPUT_DIR);
    fs::create_dir_all(dir).context("creating output directory")?;

    // One synthetic case per draw; each dataset is a different tally of them.
    let cases: Vec<(&str, &str, &str, String)> = (0..1200)
        .map(|_| {
            let post = rng.pick(POSTS);
            let penalty = rng.pick(PENALTIES);
            let cause = rng.pick(CAUSES);
            let reason = format!("{}（{}）", rng.pick(ACTS), rng.pick(CONTEXTS));
            (post, penalty, cause, reason)
        })
        .collect();
    log::debug!("Generated {} cases", cases.len());

    let by_post = tally(cases.iter().map(|(post, penalty, _, _)| (*post, *penalty)));
    let rows: Vec<Vec<String>> = by_post
        .into_iter()
        .map(|((post, penalty), n)| vec![post.to_string(), penalty.to_string(), n.to_string()])
        .collect();
    write_csv(&dir.join("data1_utf8.csv"), &["官職", "処分内容", "人数"], &rows)?;

    let by_reason = tally(
        cases
            .iter()
            .map(|(_, penalty, cause, reason)| (*cause, reason.as_str(), *penalty)),
    );
    let rows: Vec<Vec<String>> = by_reason
        .into_iter()
        .map(|((cause, reason, penalty), n)| {
            vec![cause.to_string(), reason.to_string(), penalty.to_string(), n.to_string()]
        })
        .collect();
    write_csv(
        &dir.join("data2_utf8.csv"),
        &["処分事由", "処分理由", "処分内容", "人数"],
        &rows,
    )?;

    let by_post_reason = tally(
        cases
            .iter()
            .map(|(post, _, cause, reason)| (*cause, reason.as_str(), *post)),
    );
    let rows: Vec<Vec<String>> = by_post_reason
        .into_iter()
        .map(|((cause, reason, post), n)| {
            vec![cause.to_string(), reason.to_string(), post.to_string(), n.to_string()]
        })
        .collect();
    write_csv(
        &dir.join("data3_utf8.csv"),
        &["処分事由", "処分理由", "官職等", "人数"],
        &rows,
    )?;

    Ok(())
}
