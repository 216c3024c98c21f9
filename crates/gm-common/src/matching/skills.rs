use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct SkillMatchResult {
    pub match_percentage: f64,
    /// Required skills the worker has, in the job's listing order.
    pub matched_skills: Vec<String>,
    pub missing_skills: Vec<String>,
    pub reason: String,
}

/// Exact, case-sensitive overlap between a job's required skills and a
/// worker's skills. Duplicate requirements count once.
pub fn match_required_skills(required: &[String], possessed: &[String]) -> SkillMatchResult {
    let mut seen = HashSet::new();
    let required: Vec<&String> = required.iter().filter(|s| seen.insert(*s)).collect();

    // An empty requirement set would divide by zero; treat it as a full match.
    if required.is_empty() {
        return SkillMatchResult {
            match_percentage: 1.0,
            matched_skills: vec![],
            missing_skills: vec![],
            reason: "no required skills".into(),
        };
    }

    let possessed: HashSet<&str> = possessed.iter().map(String::as_str).collect();
    let (matched, missing): (Vec<&String>, Vec<&String>) = required
        .iter()
        .copied()
        .partition(|skill| possessed.contains(skill.as_str()));

    let match_percentage = matched.len() as f64 / required.len() as f64;
    let matched_skills: Vec<String> = matched.into_iter().cloned().collect();
    let missing_skills: Vec<String> = missing.into_iter().cloned().collect();

    SkillMatchResult {
        match_percentage,
        reason: format!(
            "{}/{} required skills (matched: {} / missing: {})",
            matched_skills.len(),
            required.len(),
            join_or_none(&matched_skills),
            join_or_none(&missing_skills),
        ),
        matched_skills,
        missing_skills,
    }
}

fn join_or_none(skills: &[String]) -> String {
    if skills.is_empty() {
        "none".to_string()
    } else {
        skills.join(", ")
    }
}
