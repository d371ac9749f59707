//! Dashboard state and its transitions.
//!
//! Every mutating method is a pure state change that returns the remote writes
//! it implies. Persisting locally and shipping the returned [`SyncOp`]s is the
//! caller's job (see `ipc::helpers::commit`).

use crate::dnd::{self, Container, DropPlan, DropRejection};
use crate::error::{DomainError, DomainResult};
use crate::events::EventBoard;
use crate::model::{
    AttendanceStatus, ClassNote, ConditioningTest, Instructor, InstructorSlotAssignment,
    PaymentMethod, PaymentRecord, PaymentRecordStatus, PaymentStatus, PhysicalAssessment,
    PlanType, RegistrationStatus, SkillAchievement, SkillQuality, SkillStatus, Student,
    StudentStatus, TransferLogItem,
};
use crate::progress::{self, QualityKey};
use crate::schedule::{
    self, find_slot, parse_month, schedule_for_date, schedule_for_day, WeekdayKey,
    CAPACITY_PER_CLASS,
};
use crate::sync::{AssignmentsByDate, AttendanceByDate, RemoteSnapshot, SyncOp};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// slotId -> ordered studentIds
pub type SlotRoster = BTreeMap<String, Vec<String>>;
pub type WeeklyRoster = BTreeMap<WeekdayKey, SlotRoster>;

pub const TRANSFER_LOG_LIMIT: usize = 6;
pub const QUICK_ADD_MONTHLY_FEE: f64 = 150.0;

const MONTH_NAMES: [&str; 12] = [
    "janeiro", "fevereiro", "março", "abril", "maio", "junho", "julho", "agosto", "setembro",
    "outubro", "novembro", "dezembro",
];

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    #[serde(default)]
    pub students: Vec<Student>,
    #[serde(default)]
    pub instructors: Vec<Instructor>,
    #[serde(default)]
    pub daily_assignments: AssignmentsByDate,
    #[serde(default)]
    pub daily_attendance: AttendanceByDate,
    #[serde(default)]
    pub weekly_roster: WeeklyRoster,
    #[serde(default)]
    pub class_notes: BTreeMap<NaiveDate, BTreeMap<String, ClassNote>>,
    #[serde(default)]
    pub transfer_log: Vec<TransferLogItem>,
    #[serde(default)]
    pub events: EventBoard,
}

#[derive(Debug, Clone)]
pub struct QuickAdd {
    pub name: String,
    pub age: u32,
    pub parent_contact: String,
    pub is_trial: bool,
}

#[derive(Debug, Clone)]
pub struct PaymentInput {
    pub month: String,
    pub amount_paid: f64,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone, Copy)]
pub struct PhysicalInput {
    pub weight: f64,
    pub height: f64,
    pub waist_circumference: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct ConditioningInput {
    pub push_ups: u32,
    pub pull_ups: u32,
    pub sit_ups: u32,
    pub vertical_jump: f64,
    pub horizontal_jump: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HydrateSummary {
    pub students: usize,
    pub instructors: usize,
    pub assignments_replaced: bool,
    pub attendance_replaced: bool,
}

fn month_label(month_ref: &str) -> String {
    match parse_month(month_ref) {
        Ok((year, month)) => format!("{} de {}", MONTH_NAMES[(month - 1) as usize], year),
        Err(_) => month_ref.to_string(),
    }
}

impl DashboardState {
    // ---- assignments -------------------------------------------------------

    fn materialize_defaults(&self, date: NaiveDate) -> SlotRoster {
        let day = WeekdayKey::for_date(date);
        let base = self.weekly_roster.get(&day);
        schedule_for_day(day)
            .into_iter()
            .map(|slot| {
                let ids = base
                    .and_then(|b| b.get(&slot.id))
                    .cloned()
                    .unwrap_or_default();
                (slot.id, ids)
            })
            .collect()
    }

    /// The override for `date` if one exists, otherwise the weekly template seeded
    /// from the default roster.
    pub fn assignments_for_date(&self, date: NaiveDate) -> SlotRoster {
        match self.daily_assignments.get(&date) {
            Some(existing) => existing.clone(),
            None => self.materialize_defaults(date),
        }
    }

    pub fn has_override(&self, date: NaiveDate) -> bool {
        self.daily_assignments.contains_key(&date)
    }

    fn day_mut(&mut self, date: NaiveDate) -> &mut SlotRoster {
        if !self.daily_assignments.contains_key(&date) {
            let seeded = self.materialize_defaults(date);
            self.daily_assignments.insert(date, seeded);
        }
        self.daily_assignments.entry(date).or_default()
    }

    fn assignments_op(&self) -> SyncOp {
        SyncOp::SaveAssignments(self.daily_assignments.clone())
    }

    fn attendance_op(&self) -> SyncOp {
        SyncOp::SaveAttendance(self.daily_attendance.clone())
    }

    /// Replaces the whole list for one slot on one date. Last writer wins.
    pub fn set_assignment(
        &mut self,
        date: NaiveDate,
        slot_id: &str,
        student_ids: Vec<String>,
    ) -> Vec<SyncOp> {
        self.day_mut(date).insert(slot_id.to_string(), student_ids);
        vec![self.assignments_op()]
    }

    /// Moves `student_id` out of `from_slot` and appends it to `to_slot`.
    /// Rejections leave the date without a new override.
    pub fn move_student(
        &mut self,
        date: NaiveDate,
        student_id: &str,
        from_slot: &str,
        to_slot: &str,
    ) -> DomainResult<Vec<SyncOp>> {
        let current = self.assignments_for_date(date);
        let in_source = current
            .get(from_slot)
            .is_some_and(|ids| ids.iter().any(|id| id == student_id));
        if !in_source {
            return Err(DomainError::NotInSlot {
                student_id: student_id.to_string(),
                slot_id: from_slot.to_string(),
            });
        }
        let target_len = current
            .get(to_slot)
            .map(|ids| ids.iter().filter(|id| *id != student_id).count())
            .unwrap_or(0);
        if from_slot != to_slot && target_len >= CAPACITY_PER_CLASS {
            return Err(DomainError::SlotFull(to_slot.to_string()));
        }

        let day = self.day_mut(date);
        // A student sits in one slot per date; stray copies elsewhere go too.
        for ids in day.values_mut() {
            ids.retain(|id| id != student_id);
        }
        day.entry(to_slot.to_string())
            .or_default()
            .push(student_id.to_string());
        Ok(vec![self.assignments_op()])
    }

    /// Drag-and-drop over the slot columns of `date`.
    pub fn apply_roster_drop(
        &mut self,
        date: NaiveDate,
        active_id: &str,
        over_id: Option<&str>,
    ) -> Result<(DropPlan, Vec<SyncOp>), DropRejection> {
        let roster = self.assignments_for_date(date);
        let slots = schedule_for_date(date);
        let empty: Vec<String> = Vec::new();
        let containers: Vec<Container<'_>> = slots
            .iter()
            .map(|s| Container {
                id: s.id.as_str(),
                items: roster.get(&s.id).unwrap_or(&empty).as_slice(),
            })
            .collect();
        let plan = dnd::plan_drop(&containers, active_id, over_id, Some(CAPACITY_PER_CLASS))?;

        let day = self.day_mut(date);
        match &plan {
            DropPlan::Reorder { container, items } => {
                day.insert(container.clone(), items.clone());
            }
            DropPlan::Transfer {
                source,
                source_items,
                target,
                target_items,
            } => {
                day.insert(source.clone(), source_items.clone());
                day.insert(target.clone(), target_items.clone());
            }
        }
        Ok((plan, vec![self.assignments_op()]))
    }

    pub fn slot_of(&self, date: NaiveDate, student_id: &str) -> Option<String> {
        self.assignments_for_date(date)
            .into_iter()
            .find(|(_, ids)| ids.iter().any(|id| id == student_id))
            .map(|(slot, _)| slot)
    }

    pub fn set_weekly_roster(
        &mut self,
        day: WeekdayKey,
        slot_id: &str,
        student_ids: Vec<String>,
    ) -> DomainResult<()> {
        if find_slot(day, slot_id).is_none() {
            return Err(DomainError::UnknownSlot {
                slot_id: slot_id.to_string(),
                day: day.to_string(),
            });
        }
        self.weekly_roster
            .entry(day)
            .or_default()
            .insert(slot_id.to_string(), student_ids);
        Ok(())
    }

    // ---- attendance --------------------------------------------------------

    pub fn attendance_for_date(&self, date: NaiveDate) -> BTreeMap<String, AttendanceStatus> {
        self.daily_attendance.get(&date).cloned().unwrap_or_default()
    }

    pub fn set_attendance(
        &mut self,
        date: NaiveDate,
        student_id: &str,
        status: AttendanceStatus,
    ) -> Vec<SyncOp> {
        self.daily_attendance
            .entry(date)
            .or_default()
            .insert(student_id.to_string(), status);
        vec![self.attendance_op()]
    }

    // ---- students ----------------------------------------------------------

    pub fn student(&self, student_id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == student_id)
    }

    /// New students go to the front of the list.
    pub fn add_student(&mut self, student: Student) -> DomainResult<Vec<SyncOp>> {
        if self.student(&student.id).is_some() {
            return Err(DomainError::DuplicateStudent(student.id));
        }
        self.students.insert(0, student.clone());
        Ok(vec![SyncOp::UpsertStudent(student)])
    }

    pub fn update_student(&mut self, student: Student) -> DomainResult<Vec<SyncOp>> {
        let Some(slot) = self.students.iter_mut().find(|s| s.id == student.id) else {
            return Err(DomainError::StudentNotFound(student.id));
        };
        *slot = student.clone();
        Ok(vec![SyncOp::UpsertStudent(student)])
    }

    /// Drops the record and scrubs the id from every roster so slot counts stay honest.
    pub fn delete_student(&mut self, student_id: &str) -> DomainResult<Vec<SyncOp>> {
        let before = self.students.len();
        self.students.retain(|s| s.id != student_id);
        if self.students.len() == before {
            return Err(DomainError::StudentNotFound(student_id.to_string()));
        }
        let mut touched = false;
        for day in self.daily_assignments.values_mut() {
            for ids in day.values_mut() {
                let n = ids.len();
                ids.retain(|id| id != student_id);
                touched |= ids.len() != n;
            }
        }
        for day in self.weekly_roster.values_mut() {
            for ids in day.values_mut() {
                ids.retain(|id| id != student_id);
            }
        }
        let mut ops = vec![SyncOp::DeleteStudent(student_id.to_string())];
        if touched {
            ops.push(self.assignments_op());
        }
        Ok(ops)
    }

    pub fn quick_add_student(
        &mut self,
        date: NaiveDate,
        slot_id: &str,
        input: QuickAdd,
        today: NaiveDate,
    ) -> DomainResult<(Student, Vec<SyncOp>)> {
        let day = WeekdayKey::for_date(date);
        let slot = find_slot(day, slot_id).ok_or_else(|| DomainError::UnknownSlot {
            slot_id: slot_id.to_string(),
            day: day.to_string(),
        })?;
        let name = input.name.trim();
        if name.is_empty() {
            return Err(DomainError::Invalid("name must not be empty".to_string()));
        }
        let mut ids = self
            .assignments_for_date(date)
            .remove(slot_id)
            .unwrap_or_default();
        if ids.len() >= CAPACITY_PER_CLASS {
            return Err(DomainError::SlotFull(slot_id.to_string()));
        }

        let id = format!("stu-{}", Uuid::new_v4());
        let student = Student {
            id: id.clone(),
            name: name.to_string(),
            birth_date: format!("{:04}-01-01", today.year() - input.age as i32),
            parent_name: String::new(),
            parent_contact: input.parent_contact.trim().to_string(),
            emergency_phone: String::new(),
            allergies: String::new(),
            status: StudentStatus::Active,
            registration_status: RegistrationStatus::Incomplete,
            payment_status: PaymentStatus::UpToDate,
            main_class: format!("{} ({})", slot.time, slot.age_group.label()),
            is_trial: input.is_trial,
            photo_url: String::new(),
            enrolled_at: today.format("%Y-%m-%d").to_string(),
            plan: PlanType::Monthly,
            monthly_fee: QUICK_ADD_MONTHLY_FEE,
            attendance_history: Vec::new(),
            payment_history: Vec::new(),
            physical_assessments: Vec::new(),
            conditioning_tests: Vec::new(),
            skill_achievements: Vec::new(),
        };
        let mut ops = self.add_student(student.clone())?;
        ids.push(id);
        ops.extend(self.set_assignment(date, slot_id, ids));
        Ok((student, ops))
    }

    /// Takes the student out of their slot on `date` and logs where they went.
    pub fn transfer_student(
        &mut self,
        date: NaiveDate,
        student_id: &str,
        target_day: WeekdayKey,
        target_slot_id: &str,
        moved_at: &str,
    ) -> DomainResult<(TransferLogItem, Vec<SyncOp>)> {
        if self.student(student_id).is_none() {
            return Err(DomainError::StudentNotFound(student_id.to_string()));
        }
        if target_day == WeekdayKey::for_date(date) {
            return Err(DomainError::Invalid(
                "target day must differ from the current day".to_string(),
            ));
        }
        let target = find_slot(target_day, target_slot_id).ok_or_else(|| {
            DomainError::UnknownSlot {
                slot_id: target_slot_id.to_string(),
                day: target_day.to_string(),
            }
        })?;

        let mut ops = Vec::new();
        if let Some(current) = self.slot_of(date, student_id) {
            let remaining: Vec<String> = self
                .assignments_for_date(date)
                .remove(&current)
                .unwrap_or_default()
                .into_iter()
                .filter(|id| id != student_id)
                .collect();
            ops.extend(self.set_assignment(date, &current, remaining));
        }

        let entry = TransferLogItem {
            student_id: student_id.to_string(),
            target_day,
            target_time: target.time.to_string(),
            target_age_group: target.age_group,
            moved_at: moved_at.to_string(),
        };
        self.transfer_log.retain(|l| l.student_id != student_id);
        self.transfer_log.insert(0, entry.clone());
        self.transfer_log.truncate(TRANSFER_LOG_LIMIT);
        Ok((entry, ops))
    }

    pub fn set_class_note(
        &mut self,
        date: NaiveDate,
        slot_id: &str,
        content: &str,
        created_at: &str,
    ) -> DomainResult<ClassNote> {
        let content = content.trim();
        if content.is_empty() {
            return Err(DomainError::Invalid("note must not be empty".to_string()));
        }
        let note = ClassNote {
            slot_id: slot_id.to_string(),
            date: date.format("%Y-%m-%d").to_string(),
            content: content.to_string(),
            created_at: created_at.to_string(),
        };
        self.class_notes
            .entry(date)
            .or_default()
            .insert(slot_id.to_string(), note.clone());
        Ok(note)
    }

    pub fn class_notes_for_date(&self, date: NaiveDate) -> BTreeMap<String, ClassNote> {
        self.class_notes.get(&date).cloned().unwrap_or_default()
    }

    // ---- finance -----------------------------------------------------------

    /// Prepends a paid record billed at the student's monthly fee and marks them up to date.
    pub fn record_payment(
        &mut self,
        student_id: &str,
        input: PaymentInput,
        today: NaiveDate,
    ) -> DomainResult<(PaymentRecord, Vec<SyncOp>)> {
        parse_month(&input.month)?;
        if !(input.amount_paid > 0.0) {
            return Err(DomainError::Invalid("amount must be greater than zero".to_string()));
        }
        let mut student = self
            .student(student_id)
            .cloned()
            .ok_or_else(|| DomainError::StudentNotFound(student_id.to_string()))?;

        let today_str = today.format("%Y-%m-%d").to_string();
        let payment = PaymentRecord {
            id: format!("pay-{}", Uuid::new_v4()),
            date: today_str.clone(),
            month_reference: input.month.trim().to_string(),
            amount: student.monthly_fee,
            amount_paid: input.amount_paid,
            description: format!("Mensalidade {}", month_label(input.month.trim())),
            status: PaymentRecordStatus::Paid,
            payment_method: Some(input.method),
            paid_at: Some(today_str),
            plan: Some(student.plan),
        };
        student.payment_history.insert(0, payment.clone());
        student.payment_status = PaymentStatus::UpToDate;
        let ops = self.update_student(student)?;
        Ok((payment, ops))
    }

    // ---- progress ----------------------------------------------------------

    /// Edits a copy of the student and writes it back whole.
    fn edit_student<T>(
        &mut self,
        student_id: &str,
        edit: impl FnOnce(&mut Student) -> DomainResult<T>,
    ) -> DomainResult<(T, Vec<SyncOp>)> {
        let mut student = self
            .student(student_id)
            .cloned()
            .ok_or_else(|| DomainError::StudentNotFound(student_id.to_string()))?;
        let out = edit(&mut student)?;
        let ops = self.update_student(student)?;
        Ok((out, ops))
    }

    pub fn add_physical_assessment(
        &mut self,
        student_id: &str,
        input: PhysicalInput,
        date: NaiveDate,
    ) -> DomainResult<(PhysicalAssessment, Vec<SyncOp>)> {
        if ![input.weight, input.height, input.waist_circumference]
            .iter()
            .all(|v| v.is_finite())
        {
            return Err(DomainError::Invalid(
                "weight, height and waist must be numbers".to_string(),
            ));
        }
        let assessment = PhysicalAssessment {
            id: format!("pa-{}", Uuid::new_v4()),
            date: date.format("%Y-%m-%d").to_string(),
            weight: input.weight,
            height: input.height,
            waist_circumference: input.waist_circumference,
        };
        self.edit_student(student_id, |student| {
            student.physical_assessments.push(assessment.clone());
            Ok(assessment)
        })
    }

    pub fn add_conditioning_test(
        &mut self,
        student_id: &str,
        input: ConditioningInput,
        date: NaiveDate,
    ) -> DomainResult<(ConditioningTest, Vec<SyncOp>)> {
        if !(input.vertical_jump.is_finite() && input.horizontal_jump.is_finite()) {
            return Err(DomainError::Invalid("jump distances must be numbers".to_string()));
        }
        let test = ConditioningTest {
            id: format!("ct-{}", Uuid::new_v4()),
            date: date.format("%Y-%m-%d").to_string(),
            push_ups: input.push_ups,
            pull_ups: input.pull_ups,
            vertical_jump: input.vertical_jump,
            horizontal_jump: input.horizontal_jump,
            sit_ups: input.sit_ups,
        };
        self.edit_student(student_id, |student| {
            student.conditioning_tests.push(test.clone());
            Ok(test)
        })
    }

    /// Quality marks only survive on learned skills; any other status clears them.
    pub fn set_skill_status(
        &mut self,
        student_id: &str,
        skill_id: &str,
        status: SkillStatus,
        updated_at: &str,
    ) -> DomainResult<(SkillAchievement, Vec<SyncOp>)> {
        self.edit_student(student_id, |student| {
            let skill = skill_mut(student, skill_id)?;
            skill.status = status;
            if !progress::is_learned(status) {
                skill.quality = SkillQuality::default();
            }
            skill.updated_at = Some(updated_at.to_string());
            Ok(skill.clone())
        })
    }

    pub fn toggle_skill_quality(
        &mut self,
        student_id: &str,
        skill_id: &str,
        key: QualityKey,
        updated_at: &str,
    ) -> DomainResult<(SkillAchievement, Vec<SyncOp>)> {
        self.edit_student(student_id, |student| {
            let skill = skill_mut(student, skill_id)?;
            key.toggle(&mut skill.quality);
            skill.updated_at = Some(updated_at.to_string());
            Ok(skill.clone())
        })
    }

    // ---- instructors -------------------------------------------------------

    pub fn instructor(&self, instructor_id: &str) -> Option<&Instructor> {
        self.instructors.iter().find(|i| i.id == instructor_id)
    }

    pub fn add_instructor(&mut self, mut instructor: Instructor) -> DomainResult<Vec<SyncOp>> {
        if self.instructor(&instructor.id).is_some() {
            return Err(DomainError::DuplicateInstructor(instructor.id));
        }
        instructor.weekly_hours = instructor.assigned_slots.len() as u32;
        self.instructors.push(instructor.clone());
        Ok(vec![SyncOp::UpsertInstructor(instructor)])
    }

    pub fn update_instructor(&mut self, mut instructor: Instructor) -> DomainResult<Vec<SyncOp>> {
        let Some(slot) = self.instructors.iter_mut().find(|i| i.id == instructor.id) else {
            return Err(DomainError::InstructorNotFound(instructor.id));
        };
        instructor.weekly_hours = instructor.assigned_slots.len() as u32;
        *slot = instructor.clone();
        Ok(vec![SyncOp::UpsertInstructor(instructor)])
    }

    pub fn delete_instructor(&mut self, instructor_id: &str) -> DomainResult<Vec<SyncOp>> {
        let before = self.instructors.len();
        self.instructors.retain(|i| i.id != instructor_id);
        if self.instructors.len() == before {
            return Err(DomainError::InstructorNotFound(instructor_id.to_string()));
        }
        Ok(vec![SyncOp::DeleteInstructor(instructor_id.to_string())])
    }

    /// Assigning a (day, time) the instructor already teaches changes nothing.
    pub fn assign_instructor_slot(
        &mut self,
        instructor_id: &str,
        day: WeekdayKey,
        slot_id: &str,
    ) -> DomainResult<(Instructor, Vec<SyncOp>)> {
        let slot = find_slot(day, slot_id).ok_or_else(|| DomainError::UnknownSlot {
            slot_id: slot_id.to_string(),
            day: day.to_string(),
        })?;
        let mut instructor = self
            .instructor(instructor_id)
            .cloned()
            .ok_or_else(|| DomainError::InstructorNotFound(instructor_id.to_string()))?;
        if instructor
            .assigned_slots
            .iter()
            .any(|a| a.day == day && a.slot_time == slot.time)
        {
            return Ok((instructor, Vec::new()));
        }
        instructor.assigned_slots.push(InstructorSlotAssignment {
            day,
            slot_time: slot.time.to_string(),
            age_group: slot.age_group,
        });
        let ops = self.update_instructor(instructor)?;
        let updated = self
            .instructor(instructor_id)
            .cloned()
            .ok_or_else(|| DomainError::InstructorNotFound(instructor_id.to_string()))?;
        Ok((updated, ops))
    }

    pub fn remove_instructor_slot(
        &mut self,
        instructor_id: &str,
        index: usize,
    ) -> DomainResult<(Instructor, Vec<SyncOp>)> {
        let mut instructor = self
            .instructor(instructor_id)
            .cloned()
            .ok_or_else(|| DomainError::InstructorNotFound(instructor_id.to_string()))?;
        if index >= instructor.assigned_slots.len() {
            return Err(DomainError::Invalid(format!(
                "slot index {index} out of range"
            )));
        }
        instructor.assigned_slots.remove(index);
        let ops = self.update_instructor(instructor)?;
        let updated = self
            .instructor(instructor_id)
            .cloned()
            .ok_or_else(|| DomainError::InstructorNotFound(instructor_id.to_string()))?;
        Ok((updated, ops))
    }

    // ---- remote hydration --------------------------------------------------

    /// Remote wins wherever it has data; empty remote collections keep local state.
    pub fn hydrate(&mut self, snapshot: RemoteSnapshot) -> HydrateSummary {
        let mut summary = HydrateSummary::default();
        if !snapshot.students.is_empty() {
            summary.students = snapshot.students.len();
            self.students = snapshot.students;
        }
        if !snapshot.instructors.is_empty() {
            summary.instructors = snapshot.instructors.len();
            self.instructors = snapshot.instructors;
        }
        if let Some(assignments) = snapshot.daily_assignments {
            self.daily_assignments = assignments;
            summary.assignments_replaced = true;
        }
        if let Some(attendance) = snapshot.daily_attendance {
            self.daily_attendance = attendance;
            summary.attendance_replaced = true;
        }
        summary
    }
}

/// Slot ids of `date` in template order, followed by any extra keys the override carries.
/// Students created without a skill list get the full catalogue on first edit.
fn skill_mut<'a>(student: &'a mut Student, skill_id: &str) -> DomainResult<&'a mut SkillAchievement> {
    if student.skill_achievements.is_empty() {
        student.skill_achievements = progress::default_skill_achievements();
    }
    if !student.skill_achievements.iter().any(|s| s.id == skill_id) {
        if let Some(skill) = progress::catalogue_skill(skill_id) {
            student.skill_achievements.push(skill);
        }
    }
    student
        .skill_achievements
        .iter_mut()
        .find(|s| s.id == skill_id)
        .ok_or_else(|| DomainError::SkillNotFound(skill_id.to_string()))
}

pub fn ordered_slot_ids(date: NaiveDate, roster: &SlotRoster) -> Vec<String> {
    let mut out: Vec<String> = schedule::schedule_for_date(date)
        .into_iter()
        .map(|s| s.id)
        .collect();
    for key in roster.keys() {
        if !out.contains(key) {
            out.push(key.clone());
        }
    }
    out
}
