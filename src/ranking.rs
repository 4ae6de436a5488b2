use std::collections::{HashMap, HashSet};

use chrono::Datelike;

use crate::models::{
    Idea, IdeaBasicInfo, IdeaStatusSummary, User, UserCreationStats, UserRankingEntry,
};

pub fn department_id_set(roster: &[User]) -> HashSet<&str> {
    roster.iter().map(|u| u.id.as_str()).collect()
}

/// An idea touches the department when at least one of its implementers
/// belongs to the roster id-set.
pub fn idea_touches_department(idea: &Idea, ids: &HashSet<&str>) -> bool {
    idea.implementers
        .iter()
        .any(|imp| imp.user_id.as_deref().is_some_and(|id| ids.contains(id)))
}

pub fn filter_department_ideas<'a>(ideas: &'a [Idea], ids: &HashSet<&str>) -> Vec<&'a Idea> {
    ideas
        .iter()
        .filter(|idea| idea_touches_department(idea, ids))
        .collect()
}

/// Observed-only ranking for the execution report: one entry per roster
/// member seen implementing at least one of the pre-filtered ideas.
/// Sorted descending by idea count; ties keep first-observed order.
pub fn implementer_ranking(ideas: &[&Idea], roster: &[User]) -> Vec<UserRankingEntry> {
    let ids = department_id_set(roster);
    let names: HashMap<&str, &str> = roster
        .iter()
        .map(|u| (u.id.as_str(), u.full_name.as_str()))
        .collect();

    let mut entries: Vec<UserRankingEntry> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for idea in ideas {
        for implementer in &idea.implementers {
            let Some(user_id) = implementer.user_id.as_deref() else {
                continue;
            };
            if !ids.contains(user_id) {
                continue;
            }

            let slot = *index.entry(user_id.to_string()).or_insert_with(|| {
                let user_name = names
                    .get(user_id)
                    .map(|n| n.to_string())
                    .unwrap_or_else(|| format!("Usuário {user_id}"));
                entries.push(UserRankingEntry {
                    user_name,
                    total_ideas: 0,
                    ideas_summary: Vec::new(),
                });
                entries.len() - 1
            });

            entries[slot].ideas_summary.push(IdeaStatusSummary {
                title: idea.display_title(),
                status: idea.display_status(),
            });
        }
    }

    for entry in &mut entries {
        entry.total_ideas = entry.ideas_summary.len();
    }
    entries.sort_by(|a, b| b.total_ideas.cmp(&a.total_ideas));
    entries
}

/// Zero-filled ranking for the creation report: exactly one entry per
/// roster user, whether or not they submitted anything. Only ideas created
/// in the target year by a roster member count. Sorted descending by
/// `total_sent`; ties keep roster order.
pub fn creator_ranking(
    roster: &[User],
    ideas: &[Idea],
    target_year: i32,
    plr_target_per_user: usize,
    dept_individual_target: usize,
) -> Vec<UserCreationStats> {
    let mut stats: Vec<UserCreationStats> = roster
        .iter()
        .map(|u| UserCreationStats {
            user_id: u.id.clone(),
            user_name: u.full_name.clone(),
            total_sent: 0,
            has_submitted_idea: false,
            hit_plr_target: false,
            hit_dept_individual_target: false,
            ideas: Vec::new(),
        })
        .collect();
    let index: HashMap<&str, usize> = roster
        .iter()
        .enumerate()
        .map(|(i, u)| (u.id.as_str(), i))
        .collect();

    for idea in ideas {
        let Some(created_at) = idea.creation_timestamp() else {
            continue;
        };
        if created_at.year() != target_year {
            continue;
        }
        let Some(slot) = idea
            .creator_id
            .as_deref()
            .and_then(|id| index.get(id).copied())
        else {
            continue;
        };
        stats[slot].ideas.push(IdeaBasicInfo {
            id: idea.id,
            title: idea.display_title(),
            status: idea.display_status(),
        });
    }

    for entry in &mut stats {
        entry.total_sent = entry.ideas.len();
        entry.has_submitted_idea = entry.total_sent > 0;
        entry.hit_plr_target = entry.total_sent >= plr_target_per_user;
        entry.hit_dept_individual_target = entry.total_sent >= dept_individual_target;
    }
    stats.sort_by(|a, b| b.total_sent.cmp(&a.total_sent));
    stats
}
