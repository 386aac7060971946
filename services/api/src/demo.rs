use crate::infra::{InMemoryAlertPublisher, InMemoryClinicRepository};
use anc_risk::clinic::{
    read_register_file, AssessmentResult, ClinicService, ClinicServiceError, ClinicSummary,
    PatientRegistration,
};
use anc_risk::config::{AppConfig, ClinicConfig};
use anc_risk::error::AppError;
use chrono::{Local, NaiveDate};
use clap::Args;
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;

type DemoService = ClinicService<InMemoryClinicRepository, InMemoryAlertPublisher>;

#[derive(Args, Debug)]
pub(crate) struct AssessArgs {
    /// JSON visit payload to assess
    #[arg(long, conflicts_with = "csv", required_unless_present = "csv")]
    pub(crate) input: Option<PathBuf>,
    /// ANC register export (CSV) to assess row by row
    #[arg(long)]
    pub(crate) csv: Option<PathBuf>,
    /// Staff member recorded against each visit
    #[arg(long)]
    pub(crate) assessed_by: Option<String>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reporting date for the clinic summary (defaults to today).
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Print each assessment as JSON instead of a one-line digest.
    #[arg(long)]
    pub(crate) json: bool,
}

fn in_memory_service(config: ClinicConfig) -> (DemoService, Arc<InMemoryAlertPublisher>) {
    let alerts = Arc::new(InMemoryAlertPublisher::default());
    let service = ClinicService::new(
        Arc::new(InMemoryClinicRepository::default()),
        alerts.clone(),
        config,
    );
    (service, alerts)
}

pub(crate) fn run_assess(args: AssessArgs) -> Result<(), AppError> {
    let AssessArgs {
        input,
        csv,
        assessed_by,
    } = args;
    let config = AppConfig::load()?;
    let (service, _) = in_memory_service(config.clinic);

    if let Some(path) = csv {
        let rows = read_register_file(path)?;
        let mut rejected = 0usize;
        for row in rows {
            match row.submission {
                Ok(submission) => {
                    let result = service.assess_submission(submission, assessed_by.clone())?;
                    println!("row {}: {}", row.row, digest(&result));
                }
                Err(err) => {
                    rejected += 1;
                    println!("row {}: rejected ({err})", row.row);
                }
            }
        }
        let summary = service.summary(Local::now().date_naive())?;
        println!(
            "\n{} visits assessed, {} rows rejected, {} alerts raised",
            summary.total_visits, rejected, summary.total_alerts
        );
        return Ok(());
    }

    let Some(path) = input else {
        return Ok(());
    };
    let raw = std::fs::read_to_string(path)?;
    match service.assess(&raw, assessed_by) {
        Ok(result) => {
            print_json(&assessment_payload(&result));
            Ok(())
        }
        Err(ClinicServiceError::Intake(err)) => {
            print_json(&err.error_payload());
            Err(err.into())
        }
        Err(err) => Err(err.into()),
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { today, json } = args;
    let today = today.unwrap_or_else(|| Local::now().date_naive());
    let (service, alerts) = in_memory_service(ClinicConfig::default());

    println!("ANC hypertension risk demo ({})", service.config().facility);

    let registered = service.register_patient(PatientRegistration {
        name: "Wanjiku Mwangi".to_string(),
        dob: NaiveDate::from_ymd_opt(1997, 6, 21).unwrap_or(today),
        gestation_weeks: 12,
        phone: "0711000111".to_string(),
        village: "Kiharu".to_string(),
    })?;
    println!(
        "- Registered {} as {}",
        registered.patient.name, registered.patient.patient_id
    );

    let visits = [
        json!({
            "patient_id": registered.patient.patient_id,
            "gestation_weeks": 28,
            "systolic_bp": 120,
            "diastolic_bp": 80,
            "urine_protein": 0,
            "symptoms": [],
            "medical_history": []
        }),
        json!({
            "patient_id": "MUR002",
            "name": "Grace Wanjiru",
            "dob": "1990-01-30",
            "gestation_weeks": 32,
            "systolic_bp": 160,
            "diastolic_bp": 110,
            "urine_protein": 2,
            "symptoms": ["severe headache"],
            "medical_history": ["previous_preeclampsia"]
        }),
        json!({
            "patient_id": "MUR003",
            "name": "Esther Njeri",
            "dob": "2001-07-08",
            "gestation_weeks": 18,
            "systolic_bp": 145,
            "diastolic_bp": 92,
            "urine_protein": 1,
            "symptoms": [],
            "medical_history": ["diabetes"]
        }),
        json!({
            "patient_id": "MUR004",
            "gestation_weeks": "twenty",
            "systolic_bp": 130,
            "diastolic_bp": 85
        }),
    ];

    println!("\nVisit assessments");
    for payload in visits {
        match service.assess(&payload.to_string(), Some("Demo Nurse".to_string())) {
            Ok(result) if json => print_json(&assessment_payload(&result)),
            Ok(result) => println!("- {}", digest(&result)),
            Err(ClinicServiceError::Intake(err)) => {
                println!("- Rejected: {}", err.error_payload()["error"])
            }
            Err(err) => return Err(err.into()),
        }
    }

    let events = alerts.events();
    if events.is_empty() {
        println!("\nAlerts dispatched: none");
    } else {
        println!("\nAlerts dispatched");
        for alert in events {
            println!(
                "- [{}] {}: {}",
                alert.priority.label(),
                alert.patient_id,
                alert.message
            );
        }
    }

    render_summary(&service.summary(today)?);
    Ok(())
}

fn assessment_payload(result: &AssessmentResult) -> serde_json::Value {
    json!({
        "patient_id": result.patient.patient_id,
        "risk_assessment": result.risk_assessment,
        "alert": result.alert,
        "assessed_by": result.visit.assessed_by,
    })
}

fn digest(result: &AssessmentResult) -> String {
    let assessment = &result.risk_assessment;
    let mut line = format!(
        "{} {}/{} at {}w -> {} (score {})",
        result.patient.patient_id,
        result.visit.systolic_bp,
        result.visit.diastolic_bp,
        result.visit.gestation_weeks,
        assessment.risk_level.label(),
        assessment.score
    );
    if let Some(alert) = &result.alert {
        line.push_str(&format!(" [{} ALERT]", alert.priority.label()));
    }
    line
}

fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(err) => println!("{{\"error\": \"unable to render output: {err}\"}}"),
    }
}

fn render_summary(summary: &ClinicSummary) {
    println!("\nClinic summary for {} ({})", summary.facility, summary.today);
    println!(
        "- {} patients | {} visits | {} alerts ({} critical)",
        summary.total_patients, summary.total_visits, summary.total_alerts, summary.critical_alerts
    );

    println!("\nRisk distribution");
    for entry in &summary.risk_distribution {
        println!("- {}: {}", entry.label, entry.count);
    }

    println!("\nGestation");
    for entry in &summary.gestation_groups {
        println!("- {}: {}", entry.label, entry.count);
    }

    println!("\nAge bands");
    for entry in &summary.age_groups {
        println!("- {}: {}", entry.label, entry.count);
    }

    println!("\nVillages");
    for entry in &summary.villages {
        println!("- {}: {}", entry.label, entry.count);
    }

    if !summary.recent_visits.is_empty() {
        println!("\nRecent visits");
        for visit in &summary.recent_visits {
            println!(
                "- {} {} on {}: {}/{} {} ({:?})",
                visit.patient_id,
                visit.name,
                visit.visit_date,
                visit.systolic_bp,
                visit.diastolic_bp,
                visit.risk_level_label,
                visit.status
            );
        }
    }
}
