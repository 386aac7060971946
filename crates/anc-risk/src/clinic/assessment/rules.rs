use crate::clinic::domain::VisitObservation;

/// Danger signs scanned in this fixed order; each one present adds two points.
pub(crate) const CRITICAL_SYMPTOMS: [&str; 5] = [
    "severe headache",
    "visual disturbances",
    "epigastric pain",
    "shortness of breath",
    "decreased urine output",
];

const SYMPTOM_POINTS: u32 = 2;

/// History flags scanned in this fixed order with their points and factor text.
pub(crate) const HISTORY_FLAGS: [(&str, u32, &str); 5] = [
    ("previous_preeclampsia", 3, "History of preeclampsia"),
    ("chronic_hypertension", 2, "Chronic hypertension"),
    ("diabetes", 1, "Diabetes"),
    ("first_pregnancy", 1, "Primigravida"),
    ("multiple_pregnancy", 1, "Multiple pregnancy"),
];

/// Running total plus the factor trail, in rule-evaluation order.
#[derive(Debug, Default)]
pub(crate) struct Tally {
    pub(crate) score: u32,
    pub(crate) factors: Vec<String>,
}

impl Tally {
    fn add(&mut self, points: u32, factor: String) {
        self.score += points;
        self.factors.push(factor);
    }
}

/// Every rule is evaluated independently; all applicable rules fire and stack.
pub(crate) fn score_observation(observation: &VisitObservation) -> Tally {
    let mut tally = Tally::default();

    blood_pressure(observation, &mut tally);
    proteinuria(observation, &mut tally);
    gestation(observation, &mut tally);
    symptoms(observation, &mut tally);
    history(observation, &mut tally);

    tally
}

fn blood_pressure(observation: &VisitObservation, tally: &mut Tally) {
    let (systolic, diastolic) = (observation.systolic_bp, observation.diastolic_bp);

    if systolic >= 140 || diastolic >= 90 {
        tally.add(1, format!("Elevated BP ({systolic}/{diastolic})"));
    }

    // Deliberately not an else-branch: a severe reading also carries the elevated point.
    if systolic >= 160 || diastolic >= 110 {
        tally.add(2, format!("Severe hypertension ({systolic}/{diastolic})"));
    }
}

fn proteinuria(observation: &VisitObservation, tally: &mut Tally) {
    match observation.urine_protein {
        0 => {}
        1 => tally.add(1, "Mild proteinuria".to_string()),
        2 => tally.add(2, "Moderate proteinuria".to_string()),
        _ => tally.add(3, "Severe proteinuria".to_string()),
    }
}

fn gestation(observation: &VisitObservation, tally: &mut Tally) {
    let weeks = observation.gestational_age_weeks;
    if weeks >= 20 {
        tally.add(1, format!("Late gestation ({weeks} weeks)"));
    }
}

fn symptoms(observation: &VisitObservation, tally: &mut Tally) {
    for symptom in CRITICAL_SYMPTOMS {
        let present = observation
            .symptoms
            .iter()
            .any(|reported| reported.trim().eq_ignore_ascii_case(symptom));
        if present {
            tally.add(SYMPTOM_POINTS, format!("Symptom: {symptom}"));
        }
    }
}

fn history(observation: &VisitObservation, tally: &mut Tally) {
    for (flag, points, factor) in HISTORY_FLAGS {
        if observation.medical_history.contains(flag) {
            tally.add(points, factor.to_string());
        }
    }
}
