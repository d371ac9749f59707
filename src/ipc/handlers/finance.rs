use crate::ipc::helpers::{
    commit, get_optional_str, get_payload, get_required_str, require_workspace, respond, today,
    HandlerErr,
};
use crate::ipc::types::{AppState, Request};
use crate::model::{PaymentMethod, PaymentRecordStatus};
use crate::schedule::{month_key, parse_month};
use crate::store::PaymentInput;
use crate::summary::{self, PaymentFilter};
use serde_json::json;

/// `month` param, defaulting to the month of `today`.
fn reference_month(params: &serde_json::Value) -> Result<String, HandlerErr> {
    match get_optional_str(params, "month") {
        Some(m) => {
            parse_month(&m)?;
            Ok(m)
        }
        None => Ok(month_key(today(params)?)),
    }
}

fn finance_summary(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let month = reference_month(params)?;
    Ok(json!(summary::finance_summary(&state.store.students, &month)))
}

fn finance_payments(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let status: Option<PaymentRecordStatus> = match params.get("status") {
        Some(v) if !v.is_null() => Some(get_payload(params, "status")?),
        _ => None,
    };
    let month = get_optional_str(params, "month");
    if let Some(m) = &month {
        parse_month(m)?;
    }
    let filter = PaymentFilter {
        status,
        month,
        search: get_optional_str(params, "search"),
    };
    let rows = summary::payment_rows(&state.store.students, &filter);
    Ok(json!({ "count": rows.len(), "payments": rows }))
}

fn finance_record_payment(state: &mut AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    let student_id = get_required_str(params, "studentId")?;
    let amount_paid = params
        .get("amountPaid")
        .and_then(|v| v.as_f64())
        .ok_or_else(|| HandlerErr::bad_params("missing amountPaid"))?;
    let method: PaymentMethod = get_payload(params, "method")?;
    let input = PaymentInput {
        month: reference_month(params)?,
        amount_paid,
        method,
    };
    let (payment, ops) = state.store.record_payment(&student_id, input, today(params)?)?;
    commit(state, ops)?;
    Ok(json!({ "payment": payment }))
}

fn birthdays_list(state: &AppState, params: &serde_json::Value) -> Result<serde_json::Value, HandlerErr> {
    require_workspace(state)?;
    Ok(json!(summary::birthdays(&state.store.students, today(params)?)))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let p = &req.params;
    let result = match req.method.as_str() {
        "finance.summary" => finance_summary(state, p),
        "finance.payments" => finance_payments(state, p),
        "finance.recordPayment" => finance_record_payment(state, p),
        "birthdays.list" => birthdays_list(state, p),
        _ => return None,
    };
    Some(respond(req, result))
}
