//! Skill catalogue and the progress figures shown per student.

use crate::model::{
    AttendanceStatus, SkillAchievement, SkillCategory, SkillQuality, SkillStatus, Student,
};
use serde::{Deserialize, Serialize};

/// Every student's skill tree, in display order. Ids are `skill-<index>`.
pub const SKILL_CATALOGUE: &[(&str, SkillCategory)] = &[
    ("Precision Jump 1m", SkillCategory::Saltos),
    ("Precision Jump 2m", SkillCategory::Saltos),
    ("Running Precision", SkillCategory::Saltos),
    ("Standing Broad Jump", SkillCategory::Saltos),
    ("Gap Jump", SkillCategory::Saltos),
    ("Cat Leap", SkillCategory::Escaladas),
    ("Climb-up", SkillCategory::Escaladas),
    ("Wall Run Up", SkillCategory::Escaladas),
    ("Dyno", SkillCategory::Escaladas),
    ("Lache (Escalada)", SkillCategory::Escaladas),
    ("Sprint Approach", SkillCategory::Corridas),
    ("Wall Run", SkillCategory::Corridas),
    ("Tic-Tac", SkillCategory::Corridas),
    ("Running Cat Leap", SkillCategory::Corridas),
    ("Front Flip", SkillCategory::Giros),
    ("Side Flip", SkillCategory::Giros),
    ("Back Flip", SkillCategory::Giros),
    ("Wall Flip", SkillCategory::Giros),
    ("Cork", SkillCategory::Giros),
    ("Safety Vault", SkillCategory::Vaults),
    ("Kong Vault", SkillCategory::Vaults),
    ("Speed Vault", SkillCategory::Vaults),
    ("Dash Vault", SkillCategory::Vaults),
    ("Kash Vault", SkillCategory::Vaults),
    ("Lazy Vault", SkillCategory::Vaults),
    ("Rail Walk", SkillCategory::Equilibrios),
    ("Cat Walk", SkillCategory::Equilibrios),
    ("Crane Stance", SkillCategory::Equilibrios),
    ("Rail Squat", SkillCategory::Equilibrios),
    ("Handstand", SkillCategory::Equilibrios),
    ("Rolamento Frontal", SkillCategory::Rolamentos),
    ("PK Roll (Shoulder Roll)", SkillCategory::Rolamentos),
    ("Dive Roll", SkillCategory::Rolamentos),
    ("Rolamento Para Trás", SkillCategory::Rolamentos),
    ("Bar Swing", SkillCategory::Balancos),
    ("Lache Swing", SkillCategory::Balancos),
    ("180 Swing", SkillCategory::Balancos),
    ("Underbar", SkillCategory::Balancos),
];

fn achievement(index: usize, name: &str, category: SkillCategory) -> SkillAchievement {
    SkillAchievement {
        id: format!("skill-{index}"),
        skill_name: name.to_string(),
        category,
        status: SkillStatus::NotStarted,
        quality: SkillQuality::default(),
        updated_at: None,
    }
}

/// The whole catalogue, nothing started.
pub fn default_skill_achievements() -> Vec<SkillAchievement> {
    SKILL_CATALOGUE
        .iter()
        .enumerate()
        .map(|(i, (name, category))| achievement(i, name, *category))
        .collect()
}

pub fn catalogue_skill(skill_id: &str) -> Option<SkillAchievement> {
    let index: usize = skill_id.strip_prefix("skill-")?.parse().ok()?;
    let (name, category) = SKILL_CATALOGUE.get(index)?;
    Some(achievement(index, name, *category))
}

/// Mastered and fluid skills are the ones that count as learned.
pub fn is_learned(status: SkillStatus) -> bool {
    matches!(status, SkillStatus::Mastered | SkillStatus::Fluid)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityKey {
    Control,
    Silence,
    Flow,
    Courage,
}

impl QualityKey {
    pub fn toggle(self, quality: &mut SkillQuality) {
        let flag = match self {
            QualityKey::Control => &mut quality.control,
            QualityKey::Silence => &mut quality.silence,
            QualityKey::Flow => &mut quality.flow,
            QualityKey::Courage => &mut quality.courage,
        };
        *flag = !*flag;
    }
}

fn percent(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u32
}

/// Present or late over every recorded class, as a whole percentage.
pub fn attendance_rate(student: &Student) -> u32 {
    let attended = student
        .attendance_history
        .iter()
        .filter(|a| matches!(a.status, AttendanceStatus::Present | AttendanceStatus::Late))
        .count();
    percent(attended, student.attendance_history.len())
}

/// Learned skills over the student's skill list. No list means 0.
pub fn skill_progress(student: &Student) -> u32 {
    let learned = student
        .skill_achievements
        .iter()
        .filter(|s| is_learned(s.status))
        .count();
    percent(learned, student.skill_achievements.len())
}

pub fn assessment_count(student: &Student) -> usize {
    student.physical_assessments.len() + student.conditioning_tests.len()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentProgress {
    pub student_id: String,
    pub name: String,
    pub attendance_rate: u32,
    pub skill_progress: u32,
    pub assessments: usize,
}

impl StudentProgress {
    pub fn of(student: &Student) -> Self {
        Self {
            student_id: student.id.clone(),
            name: student.name.clone(),
            attendance_rate: attendance_rate(student),
            skill_progress: skill_progress(student),
            assessments: assessment_count(student),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressOverview {
    pub students: usize,
    pub avg_attendance: u32,
    pub avg_skill_progress: u32,
    pub total_assessments: usize,
    pub rows: Vec<StudentProgress>,
}

fn mean(values: impl Iterator<Item = u32>, count: usize) -> u32 {
    if count == 0 {
        return 0;
    }
    let sum: u32 = values.sum();
    (sum as f64 / count as f64).round() as u32
}

/// Averages are taken over the already rounded per-student figures.
pub fn progress_overview(students: &[Student]) -> ProgressOverview {
    let rows: Vec<StudentProgress> = students.iter().map(StudentProgress::of).collect();
    ProgressOverview {
        students: rows.len(),
        avg_attendance: mean(rows.iter().map(|r| r.attendance_rate), rows.len()),
        avg_skill_progress: mean(rows.iter().map(|r| r.skill_progress), rows.len()),
        total_assessments: rows.iter().map(|r| r.assessments).sum(),
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn student(v: serde_json::Value) -> Student {
        serde_json::from_value(v).unwrap()
    }

    fn visit(status: &str) -> serde_json::Value {
        json!({ "date": "2024-06-03", "status": status, "slotId": "segunda-0900" })
    }

    #[test]
    fn catalogue_ids_resolve_back_to_their_skill() {
        let all = default_skill_achievements();
        assert_eq!(all.len(), SKILL_CATALOGUE.len());
        assert_eq!(all[0].id, "skill-0");
        assert_eq!(catalogue_skill("skill-16").map(|s| s.skill_name), Some("Back Flip".into()));
        assert_eq!(catalogue_skill(&format!("skill-{}", all.len())), None);
        assert_eq!(catalogue_skill("backflip"), None);
    }

    #[test]
    fn attendance_rate_counts_late_as_attended() {
        let s = student(json!({
            "id": "s", "name": "s",
            "attendanceHistory": [visit("present"), visit("late"), visit("absent")]
        }));
        assert_eq!(attendance_rate(&s), 67);
        assert_eq!(attendance_rate(&student(json!({ "id": "e", "name": "e" }))), 0);
    }

    #[test]
    fn skill_progress_counts_mastered_and_fluid() {
        let mut s = student(json!({ "id": "s", "name": "s" }));
        assert_eq!(skill_progress(&s), 0);
        s.skill_achievements = default_skill_achievements().into_iter().take(8).collect();
        s.skill_achievements[0].status = SkillStatus::Mastered;
        s.skill_achievements[1].status = SkillStatus::Fluid;
        s.skill_achievements[2].status = SkillStatus::Learning;
        assert_eq!(skill_progress(&s), 25);
    }

    #[test]
    fn overview_averages_rounded_rates_and_totals_assessments() {
        let a = student(json!({
            "id": "a", "name": "A",
            "attendanceHistory": [visit("present"), visit("absent"), visit("absent")],
            "physicalAssessments": [
                { "id": "p1", "date": "2024-06-01", "weight": 40.0, "height": 150.0, "waistCircumference": 60.0 }
            ]
        }));
        let b = student(json!({
            "id": "b", "name": "B",
            "attendanceHistory": [visit("present")],
            "conditioningTests": [
                { "id": "c1", "date": "2024-06-01", "pushUps": 10, "pullUps": 2,
                  "verticalJump": 30.0, "horizontalJump": 150.0, "sitUps": 20 }
            ]
        }));
        let overview = progress_overview(&[a, b]);
        assert_eq!(overview.students, 2);
        // (33 + 100) / 2 = 66.5
        assert_eq!(overview.avg_attendance, 67);
        assert_eq!(overview.avg_skill_progress, 0);
        assert_eq!(overview.total_assessments, 2);
        assert_eq!(overview.rows[0].attendance_rate, 33);

        let empty = progress_overview(&[]);
        assert_eq!((empty.avg_attendance, empty.total_assessments), (0, 0));
    }

    #[test]
    fn quality_toggle_flips_one_flag() {
        let mut q = SkillQuality::default();
        QualityKey::Flow.toggle(&mut q);
        assert!(q.flow && !q.control && !q.silence && !q.courage);
        QualityKey::Flow.toggle(&mut q);
        assert_eq!(q, SkillQuality::default());
    }
}
