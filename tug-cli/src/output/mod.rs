// Terminal rendering for analyses and reports

use colored::{ColoredString, Colorize};
use tug_analysis::models::{Phase, SeverityLevel, SeverityResult, SummaryReport, VideoAnalysis};
use tug_analysis::services::BatchOutcome;

const RULE: &str = "────────────────────────────────";

pub fn severity_label(level: SeverityLevel) -> ColoredString {
    let text = level.to_string();
    match level {
        SeverityLevel::Normal => text.green().bold(),
        SeverityLevel::Slight => text.cyan().bold(),
        SeverityLevel::Mild => text.yellow().bold(),
        SeverityLevel::Moderate => text.magenta().bold(),
        SeverityLevel::Severe => text.red().bold(),
    }
}

fn optional(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", decimals, v),
        None => "n/a".dimmed().to_string(),
    }
}

pub fn print_severity(result: &SeverityResult) {
    println!(
        "Severity: {} (score {}/4)",
        severity_label(result.level),
        result.score
    );
    println!("  {}", result.rationale);
}

pub fn print_analysis(analysis: &VideoAnalysis) {
    println!("{}", format!("TUG Analysis: {}", analysis.video_id).bold());
    println!("{}", RULE);
    println!(
        "Frames: {} at {} fps (processed in {}ms)",
        analysis.processing.total_frames, analysis.processing.fps, analysis.processing.processing_time_ms
    );
    println!();

    println!("{}", "Phase durations".bold());
    let durations = &analysis.tug.phase_durations;
    for phase in Phase::ALL {
        let seconds = durations.get(phase);
        if seconds > 0.0 {
            println!("  {:<16} {:>6.2}s", phase.label(), seconds);
        } else {
            println!("  {:<16} {:>7}", phase.label(), "-".dimmed());
        }
    }
    println!();

    let tug = &analysis.tug;
    println!("{}", "Timing".bold());
    println!("  Total time:       {:.2}s", tug.total_time);
    println!("  Walking time:     {:.2}s", tug.total_walking_time);
    println!("  Turning time:     {:.2}s", tug.total_turning_time);
    println!("  Turn/walk ratio:  {:.2}", tug.turn_walk_ratio);
    println!();

    let gait = &analysis.gait;
    println!("{}", "Gait".bold());
    println!("  Steps:            {}", gait.step_count);
    println!("  Mean step length: {:.3}", gait.mean_step_length);
    println!("  Stride time:      {:.2}s", gait.stride_time);
    println!("  Cadence:          {:.1} steps/min", gait.cadence);
    println!("  Step symmetry:    {}", optional(gait.step_symmetry, 3));
    println!("  Knee range L/R:   {:.1}° / {:.1}°", gait.left_knee_range, gait.right_knee_range);
    println!("  Upper-body sway:  {}", optional(gait.upper_body_sway, 4));
    println!();

    print_severity(&analysis.severity);
}

pub fn print_batch_outcome(outcome: &BatchOutcome) {
    println!();
    println!("{}", "Batch Summary".bold());
    println!("{}", RULE);
    println!(
        "{} analyzed, {} failed, {} skipped",
        outcome.analyses.len().to_string().green(),
        outcome.failures.len().to_string().red(),
        outcome.skipped.len()
    );

    for analysis in &outcome.analyses {
        println!(
            "  {} {:<24} {:>6.2}s  {}",
            "✓".green(),
            analysis.video_id,
            analysis.tug.total_time,
            severity_label(analysis.severity.level)
        );
    }
    for failure in &outcome.failures {
        let category = failure
            .category
            .map(|c| c.to_string())
            .unwrap_or_else(|| "internal".to_string());
        println!(
            "  {} {:<24} [{}] {}",
            "✗".red(),
            failure.video_id,
            category,
            failure.error
        );
    }
}

pub fn print_report(report: &SummaryReport) {
    println!("{}", "TUG Summary Report".bold());
    println!("{}", RULE);
    println!("Total tests:            {}", report.total_tests);
    println!("Average total time:     {:.2}s", report.average_total_time);
    println!("Average turn/walk ratio: {:.2}", report.average_turn_walk_ratio);
    println!();

    println!("{}", "Severity distribution".bold());
    for (level, count) in &report.severity_distribution {
        println!(
            "  {:<10} {:>4} ({:>5.1}%)",
            severity_label(*level),
            count.count,
            count.percentage
        );
    }
    println!();

    println!("{}", "Per-level statistics".bold());
    for (level, detail) in &report.severity_details {
        println!("  {} ({} tests)", severity_label(*level), detail.count);
        let time = &detail.total_time_stats;
        println!(
            "    Total time: mean {:.2}s, std {}, range {:.2}-{:.2}s",
            time.mean,
            optional(time.std, 2),
            time.min,
            time.max
        );
        let ratio = &detail.turn_walk_ratio_stats;
        println!(
            "    Turn/walk ratio: mean {:.2}, std {}, range {:.2}-{:.2}",
            ratio.mean,
            optional(ratio.std, 2),
            ratio.min,
            ratio.max
        );
        println!(
            "    Mean walking {:.2}s, mean turning {:.2}s",
            detail.mean_walking_time, detail.mean_turning_time
        );
    }
    println!();

    let risk = &report.risk_assessment;
    println!("{}", "Risk assessment".bold());
    println!(
        "  High risk (Moderate/Severe): {} tests ({:.1}%)",
        risk.high_risk_count, risk.high_risk_percentage
    );
    println!(
        "  Fall risk (slow completion): {} tests ({:.1}%)",
        risk.fall_risk_count, risk.fall_risk_percentage
    );
    println!();

    println!("{}", "Phase statistics".bold());
    for (phase, stats) in &report.phase_statistics {
        println!(
            "  {:<16} avg {:.2}s, range {:.2}-{:.2}s, present in {}/{} videos",
            phase.label(),
            stats.average_duration,
            stats.min_duration,
            stats.max_duration,
            stats.videos_with_phase,
            report.total_tests
        );
    }
}
