//! Simulation report generation.

use super::config::SimConfig;
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of one simulated battle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunStats {
    pub seed: u64,
    pub kills: u64,
    pub deaths: u64,
    pub damage_dealt: f64,
    pub damage_taken: f64,
    pub dps: f64,
    pub waves_cleared: u64,
    pub runs_completed: u64,
    pub dungeon_resets: u64,
    pub rng_draws: u64,
    pub segments: usize,
    /// `None` when offline verification was off
    pub offline_matches: Option<bool>,
}

/// Aggregated results from multiple simulation runs.
#[derive(Debug, Clone, Serialize)]
pub struct SimReport {
    pub num_runs: u32,
    pub encounter: String,
    pub profession: String,
    pub duration_seconds: f64,

    pub avg_kills: f64,
    pub avg_deaths: f64,
    pub avg_dps: f64,
    pub avg_damage_taken: f64,
    pub avg_waves_cleared: f64,
    pub avg_runs_completed: f64,
    pub avg_rng_draws: f64,

    /// deaths per battle -> number of battles
    pub death_distribution: BTreeMap<u64, u32>,
    pub offline_mismatches: u32,

    pub run_stats: Vec<RunStats>,
}

fn average<F: Fn(&RunStats) -> f64>(runs: &[RunStats], f: F) -> f64 {
    if runs.is_empty() {
        return 0.0;
    }
    runs.iter().map(f).sum::<f64>() / runs.len() as f64
}

impl SimReport {
    pub fn from_runs(config: &SimConfig, runs: Vec<RunStats>) -> Self {
        let mut death_distribution = BTreeMap::new();
        for run in &runs {
            *death_distribution.entry(run.deaths).or_insert(0) += 1;
        }
        let offline_mismatches = runs
            .iter()
            .filter(|r| r.offline_matches == Some(false))
            .count() as u32;

        Self {
            num_runs: runs.len() as u32,
            encounter: config.encounter.clone(),
            profession: config.profession.name().to_string(),
            duration_seconds: config.duration_seconds,
            avg_kills: average(&runs, |r| r.kills as f64),
            avg_deaths: average(&runs, |r| r.deaths as f64),
            avg_dps: average(&runs, |r| r.dps),
            avg_damage_taken: average(&runs, |r| r.damage_taken),
            avg_waves_cleared: average(&runs, |r| r.waves_cleared as f64),
            avg_runs_completed: average(&runs, |r| r.runs_completed as f64),
            avg_rng_draws: average(&runs, |r| r.rng_draws as f64),
            death_distribution,
            offline_mismatches,
            run_stats: runs,
        }
    }

    /// Generate a text report.
    pub fn to_text(&self) -> String {
        let mut report = String::new();

        report.push_str("═══════════════════════════════════════════════════════════════\n");
        report.push_str("                    BATTLE SIMULATION REPORT\n");
        report.push_str("═══════════════════════════════════════════════════════════════\n\n");

        report.push_str(&format!(
            "Runs: {} × {:.0}s  |  {} vs {}\n\n",
            self.num_runs, self.duration_seconds, self.profession, self.encounter
        ));

        report.push_str("── COMBAT ───────────────────────────────────────────────────────\n");
        report.push_str(&format!("  Avg DPS:             {:.2}\n", self.avg_dps));
        report.push_str(&format!("  Avg Kills:           {:.1}\n", self.avg_kills));
        report.push_str(&format!("  Avg Deaths:          {:.2}\n", self.avg_deaths));
        report.push_str(&format!(
            "  Avg Damage Taken:    {:.0}\n",
            self.avg_damage_taken
        ));
        report.push_str(&format!(
            "  Avg Waves Cleared:   {:.1}\n",
            self.avg_waves_cleared
        ));
        report.push_str(&format!(
            "  Avg Runs Completed:  {:.2}\n",
            self.avg_runs_completed
        ));
        report.push_str(&format!(
            "  Avg RNG Draws:       {:.0}\n\n",
            self.avg_rng_draws
        ));

        report.push_str("── DEATHS PER BATTLE ────────────────────────────────────────────\n");
        for (deaths, count) in &self.death_distribution {
            let pct = (*count as f64 / self.num_runs.max(1) as f64) * 100.0;
            let bar: String = "█".repeat((pct / 5.0) as usize);
            report.push_str(&format!("  {:>3}: {:>5.1}% {}\n", deaths, pct, bar));
        }

        if self.run_stats.iter().any(|r| r.offline_matches.is_some()) {
            report.push_str("\n── OFFLINE EQUIVALENCE ──────────────────────────────────────────\n");
            if self.offline_mismatches == 0 {
                report.push_str("  All runs matched the offline engine\n");
            } else {
                report.push_str(&format!(
                    "  ⚠ {} run(s) diverged from the offline engine\n",
                    self.offline_mismatches
                ));
            }
        }

        report
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
