use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Utc};

use crate::classify::{self, ImplementationKeywords, ImplementationOutcome, PhaseKeywords};
use crate::models::{
    CombinedReport, CreationReport, ExecutionReport, Idea, IdeaBasicInfo, IndividualReport,
    StatusDistribution, TimelineComparison, TimelineMetric, User,
};
use crate::ranking;
use crate::timeline::{self, PhaseCounts};

/// Caller-supplied quota set for the creation report. The engine never
/// hardcodes these.
#[derive(Debug, Clone, Copy)]
pub struct CreationTargets {
    pub plr_per_user: usize,
    pub dept_individual: usize,
    pub monthly_aggregate: usize,
    pub weekly_aggregate: usize,
}

/// Percentage breakdown of `current_stage_name`, rounded to two decimals,
/// sorted descending; ties keep first-observed order. Empty input gives an
/// empty list.
pub fn status_distribution(ideas: &[&Idea]) -> Vec<StatusDistribution> {
    let total = ideas.len();
    if total == 0 {
        return Vec::new();
    }

    let mut counts: Vec<(String, usize)> = Vec::new();
    let mut index: std::collections::HashMap<String, usize> = std::collections::HashMap::new();
    for idea in ideas {
        let status = idea
            .current_stage_name
            .clone()
            .unwrap_or_else(|| "Sem Status".to_string());
        match index.get(&status) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(status.clone(), counts.len());
                counts.push((status, 1));
            }
        }
    }

    let mut distribution: Vec<StatusDistribution> = counts
        .into_iter()
        .map(|(status_title, count)| StatusDistribution {
            status_title,
            count,
            percentage: ((count as f64 / total as f64) * 10_000.0).round() / 100.0,
        })
        .collect();
    distribution.sort_by(|a, b| b.count.cmp(&a.count));
    distribution
}

/// Departmental execution funnel: which ideas the department's people are
/// implementing, how far along the funnel they got, and when.
pub fn execution_report(
    roster: &[User],
    ideas: &[Idea],
    target_year: i32,
    window_weeks: i64,
    now: DateTime<Utc>,
    keywords: &PhaseKeywords,
) -> ExecutionReport {
    let ids = ranking::department_id_set(roster);
    let department_ideas = ranking::filter_department_ideas(ideas, &ids);

    let cutoff = timeline::window_cutoff(window_weeks, now);
    let mut monthly = timeline::monthly_buckets::<PhaseCounts>(target_year);
    let mut weekly = timeline::weekly_buckets::<PhaseCounts>(window_weeks, now);

    for idea in &department_ideas {
        let phases = classify::classify(&idea.stages, keywords);
        if let Some(ts) = phases.approval_sent.and_then(|s| s.event_timestamp()) {
            timeline::allocate(ts, target_year, cutoff, &mut monthly, &mut weekly, |c| {
                c.approval_sent += 1
            });
        }
        if let Some(ts) = phases.validation_sent.and_then(|s| s.event_timestamp()) {
            timeline::allocate(ts, target_year, cutoff, &mut monthly, &mut weekly, |c| {
                c.validation_sent += 1
            });
        }
        if let Some(ts) = phases.implemented.and_then(|s| s.event_timestamp()) {
            timeline::allocate(ts, target_year, cutoff, &mut monthly, &mut weekly, |c| {
                c.implemented += 1
            });
        }
    }

    ExecutionReport {
        total_ideas_analyzed: department_ideas.len(),
        user_ranking: ranking::implementer_ranking(&department_ideas, roster),
        status_distribution: status_distribution(&department_ideas),
        monthly_timeline: phase_timeline(monthly),
        weekly_timeline: phase_timeline(weekly),
    }
}

fn phase_timeline(buckets: BTreeMap<String, PhaseCounts>) -> Vec<TimelineMetric> {
    buckets
        .into_iter()
        .map(|(period, counts)| TimelineMetric {
            period,
            approval_sent_count: counts.approval_sent,
            validation_sent_count: counts.validation_sent,
            implemented_count: counts.implemented,
        })
        .collect()
}

/// Departmental creation report: zero-filled submission ranking plus
/// monthly/weekly submission volumes compared against aggregate targets.
pub fn creation_report(
    roster: &[User],
    ideas: &[Idea],
    target_year: i32,
    window_weeks: i64,
    now: DateTime<Utc>,
    targets: &CreationTargets,
) -> CreationReport {
    let user_ranking = ranking::creator_ranking(
        roster,
        ideas,
        target_year,
        targets.plr_per_user,
        targets.dept_individual,
    );

    let ids = ranking::department_id_set(roster);
    let cutoff = timeline::window_cutoff(window_weeks, now);
    let mut monthly = timeline::monthly_buckets::<usize>(target_year);
    let mut weekly = timeline::weekly_buckets::<usize>(window_weeks, now);

    for idea in ideas {
        let Some(created_at) = idea.creation_timestamp() else {
            continue;
        };
        let in_roster = idea
            .creator_id
            .as_deref()
            .is_some_and(|id| ids.contains(id));
        if !in_roster {
            continue;
        }
        timeline::allocate(created_at, target_year, cutoff, &mut monthly, &mut weekly, |c| {
            *c += 1
        });
    }

    CreationReport {
        target_year,
        user_ranking,
        monthly_timeline: comparison_timeline(monthly, targets.monthly_aggregate),
        weekly_timeline: comparison_timeline(weekly, targets.weekly_aggregate),
    }
}

fn comparison_timeline(
    buckets: BTreeMap<String, usize>,
    target: usize,
) -> Vec<TimelineComparison> {
    buckets
        .into_iter()
        .map(|(period, total_sent)| TimelineComparison {
            period,
            total_sent,
            target,
            hit_target: total_sent >= target,
        })
        .collect()
}

/// Pure composition of the two departmental reports over one snapshot.
pub fn combined_report(
    roster: &[User],
    ideas: &[Idea],
    target_year: i32,
    window_weeks: i64,
    now: DateTime<Utc>,
    keywords: &PhaseKeywords,
    targets: &CreationTargets,
) -> CombinedReport {
    CombinedReport {
        execution_analytics: execution_report(
            roster,
            ideas,
            target_year,
            window_weeks,
            now,
            keywords,
        ),
        creation_analytics: creation_report(roster, ideas, target_year, window_weeks, now, targets),
    }
}

/// Individual performance report for one matricula. Returns `None` when no
/// roster member carries that login, so the boundary can answer 404-style
/// instead of failing.
pub fn individual_report(
    roster: &[User],
    ideas: &[Idea],
    target_year: i32,
    matricula: &str,
    keywords: &ImplementationKeywords,
) -> Option<IndividualReport> {
    let user = roster.iter().find(|u| u.username == matricula)?;

    let created: Vec<&Idea> = ideas
        .iter()
        .filter(|idea| {
            idea.creator_id.as_deref() == Some(user.id.as_str())
                && idea
                    .creation_timestamp()
                    .is_some_and(|ts| ts.year() == target_year)
        })
        .collect();

    let mut pending_list = Vec::new();
    let mut completed_count = 0;
    for idea in ideas {
        let is_implementer = idea
            .implementers
            .iter()
            .any(|imp| imp.user_id.as_deref() == Some(user.id.as_str()));
        if !is_implementer {
            continue;
        }

        match keywords.triage(idea.current_stage_name.as_deref().unwrap_or("")) {
            ImplementationOutcome::Completed => completed_count += 1,
            ImplementationOutcome::Pending => pending_list.push(IdeaBasicInfo {
                id: idea.id,
                title: idea.display_title(),
                status: idea.display_status(),
            }),
            ImplementationOutcome::Excluded => {}
        }
    }

    Some(IndividualReport {
        user_matricula: matricula.to_string(),
        user_name: user.full_name.clone(),
        target_year,
        created_count: created.len(),
        created_status_distribution: status_distribution(&created),
        pending_implementation_count: pending_list.len(),
        pending_implementation_list: pending_list,
        completed_implementation_count: completed_count,
    })
}
