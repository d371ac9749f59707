use crate::schedule::{AgeGroup, WeekdayKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    #[default]
    None,
    Present,
    Absent,
    Late,
}

impl AttendanceStatus {
    pub fn parse(s: &str) -> Option<AttendanceStatus> {
        match s.trim() {
            "none" => Some(AttendanceStatus::None),
            "present" => Some(AttendanceStatus::Present),
            "absent" => Some(AttendanceStatus::Absent),
            "late" => Some(AttendanceStatus::Late),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StudentStatus {
    #[default]
    #[serde(rename = "Ativo")]
    Active,
    #[serde(rename = "Inativo")]
    Inactive,
    #[serde(rename = "Trancado")]
    Suspended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum RegistrationStatus {
    #[serde(rename = "Completo")]
    Complete,
    #[default]
    #[serde(rename = "Incompleto")]
    Incomplete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PaymentStatus {
    #[serde(rename = "Em dia")]
    UpToDate,
    #[serde(rename = "Atrasado")]
    Overdue,
    #[default]
    #[serde(rename = "Pendente")]
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentMethod {
    Pix,
    #[serde(rename = "Cartão")]
    Card,
    #[serde(rename = "Dinheiro")]
    Cash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlanType {
    #[default]
    #[serde(rename = "Mensal")]
    Monthly,
    #[serde(rename = "Trimestral")]
    Quarterly,
    #[serde(rename = "Semestral")]
    Biannual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentRecordStatus {
    Paid,
    Pending,
    Overdue,
}

impl PaymentRecordStatus {
    pub fn is_outstanding(self) -> bool {
        matches!(self, PaymentRecordStatus::Pending | PaymentRecordStatus::Overdue)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkillStatus {
    #[default]
    NotStarted,
    Learning,
    Mastered,
    Fluid,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    Saltos,
    Escaladas,
    Corridas,
    Giros,
    Vaults,
    Equilibrios,
    Rolamentos,
    Balancos,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub date: String,
    pub status: AttendanceStatus,
    pub slot_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    pub id: String,
    pub date: String,
    /// `YYYY-MM`
    pub month_reference: String,
    pub amount: f64,
    pub amount_paid: f64,
    pub description: String,
    pub status: PaymentRecordStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan: Option<PlanType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhysicalAssessment {
    pub id: String,
    pub date: String,
    pub weight: f64,
    pub height: f64,
    pub waist_circumference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConditioningTest {
    pub id: String,
    pub date: String,
    pub push_ups: u32,
    pub pull_ups: u32,
    pub vertical_jump: f64,
    pub horizontal_jump: f64,
    pub sit_ups: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SkillQuality {
    pub control: bool,
    pub silence: bool,
    pub flow: bool,
    pub courage: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillAchievement {
    pub id: String,
    pub skill_name: String,
    pub category: SkillCategory,
    pub status: SkillStatus,
    #[serde(default)]
    pub quality: SkillQuality,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

/// A student record. Always replaced whole; there is no field-level patch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub birth_date: String,
    #[serde(default)]
    pub parent_name: String,
    #[serde(default)]
    pub parent_contact: String,
    #[serde(default)]
    pub emergency_phone: String,
    #[serde(default)]
    pub allergies: String,
    #[serde(default)]
    pub status: StudentStatus,
    #[serde(default)]
    pub registration_status: RegistrationStatus,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub main_class: String,
    #[serde(default)]
    pub is_trial: bool,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub enrolled_at: String,
    #[serde(default)]
    pub plan: PlanType,
    #[serde(default)]
    pub monthly_fee: f64,
    #[serde(default)]
    pub attendance_history: Vec<AttendanceRecord>,
    #[serde(default)]
    pub payment_history: Vec<PaymentRecord>,
    #[serde(default)]
    pub physical_assessments: Vec<PhysicalAssessment>,
    #[serde(default)]
    pub conditioning_tests: Vec<ConditioningTest>,
    #[serde(default)]
    pub skill_achievements: Vec<SkillAchievement>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstructorSlotAssignment {
    pub day: WeekdayKey,
    pub slot_time: String,
    pub age_group: AgeGroup,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub weekly_hours: u32,
    #[serde(default)]
    pub max_hours: u32,
    #[serde(default)]
    pub assigned_slots: Vec<InstructorSlotAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassNote {
    pub slot_id: String,
    pub date: String,
    pub content: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferLogItem {
    pub student_id: String,
    pub target_day: WeekdayKey,
    pub target_time: String,
    pub target_age_group: AgeGroup,
    pub moved_at: String,
}
