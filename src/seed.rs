//! Initial records the models start with.

use chrono::{NaiveDate, NaiveDateTime};

use crate::models::{
    Board, Booking, Category, Column, DocumentRevision, DocumentStatus, DocumentType, Incident, IncidentSeverity,
    IncidentStatus, Instrument, InstrumentStatus, LabDocument, NcSeverity, NcSource, NcStatus, NonConformity,
    Priority, Task, WorkCategory,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default()
}

fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    date(y, m, d).and_hms_opt(h, min, 0).unwrap_or_default()
}

fn tags(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn doc(
    id: &str,
    title: &str,
    doc_type: DocumentType,
    version: &str,
    status: DocumentStatus,
    author: &str,
    reviewer: Option<&str>,
    approver: Option<&str>,
    description: &str,
    tag_list: &[&str],
    created_at: NaiveDate,
    updated_at: NaiveDate,
    effective_date: Option<NaiveDate>,
    review_due: Option<NaiveDate>,
) -> LabDocument {
    LabDocument {
        id: id.to_string(),
        title: title.to_string(),
        doc_type,
        version: version.to_string(),
        status,
        author: author.to_string(),
        reviewer: reviewer.map(str::to_string),
        approver: approver.map(str::to_string),
        description: description.to_string(),
        tags: tags(tag_list),
        created_at,
        updated_at,
        effective_date,
        review_due,
    }
}

/// Controlled documents.
pub fn documents() -> Vec<LabDocument> {
    use DocumentStatus::*;
    use DocumentType::*;

    vec![
        doc(
            "DOC-2024-001",
            "ICP-MS Standard Operating Procedure",
            Sop,
            "2.3",
            Approved,
            "Dr. S. Chen",
            Some("Dr. M. Rousseau"),
            Some("Lab Director"),
            "Complete operating procedure for the Inductively Coupled Plasma Mass Spectrometer (ICP-MS Omega). \
             Covers instrument startup, calibration standards, sample preparation, analysis sequence, data \
             validation, and shutdown routine.",
            &["ICP-MS", "spectrometry", "calibration", "elemental"],
            date(2022, 3, 15),
            date(2024, 1, 10),
            Some(date(2024, 1, 15)),
            Some(date(2025, 1, 15)),
        ),
        doc(
            "DOC-2024-002",
            "Chemical Spill Containment Protocol",
            Protocol,
            "2.1",
            Approved,
            "Safety Committee",
            Some("Dr. A. Moreau"),
            Some("Safety Officer"),
            "Emergency response protocol for chemical spills in the laboratory. Classifies spill severity \
             (minor / moderate / major), specifies PPE requirements per hazard class, and provides step-by-step \
             containment, neutralisation, and disposal procedures.",
            &["safety", "emergency", "chemical", "spill"],
            date(2023, 6, 1),
            date(2024, 2, 1),
            Some(date(2024, 2, 15)),
            Some(date(2025, 2, 15)),
        ),
        doc(
            "DOC-2024-003",
            "Fume Hood Safety Inspection Form",
            Form,
            "1.0",
            UnderReview,
            "T. Nakamura",
            Some("Dr. S. Chen"),
            None,
            "Monthly inspection checklist for all laboratory fume hoods. Covers face velocity measurements, sash \
             position indicators, interior cleanliness, alarm functionality, and service history logging.",
            &["fume hood", "inspection", "safety", "monthly"],
            date(2024, 11, 20),
            date(2024, 11, 20),
            None,
            Some(date(2025, 11, 20)),
        ),
        doc(
            "DOC-2024-004",
            "Calibration Log Template — General Instruments",
            CalibrationRecord,
            "1.2",
            Approved,
            "Quality Assurance",
            Some("Dr. M. Rousseau"),
            Some("Quality Manager"),
            "Standardised template for recording instrument calibration data. Compliant with ISO 17025:2017 §6.4 \
             requirements for equipment records. Includes fields for uncertainty of measurement, traceability \
             references, and calibration interval justification.",
            &["calibration", "ISO 17025", "template", "quality"],
            date(2023, 1, 5),
            date(2024, 3, 1),
            Some(date(2024, 3, 10)),
            Some(date(2025, 3, 10)),
        ),
        doc(
            "DOC-2025-005",
            "HPLC Analysis Work Instruction — Pesticide Residues",
            WorkInstruction,
            "1.0",
            Draft,
            "P. Lambert",
            Some("Dr. S. Chen"),
            None,
            "Step-by-step work instruction for HPLC-based analysis of pesticide residues in water samples. \
             Drafted following updated method validation data. Pending peer review by the analytical team prior \
             to submission for approval.",
            &["HPLC", "pesticides", "water", "analysis", "method validation"],
            date(2025, 1, 15),
            date(2025, 1, 15),
            None,
            None,
        ),
        doc(
            "DOC-2023-006",
            "Laboratory Access and Security Policy",
            Policy,
            "3.0",
            Approved,
            "Administration",
            Some("Safety Officer"),
            Some("Lab Director"),
            "Policy governing access to laboratory facilities. Covers visitor management, keycard authorisation \
             levels, out-of-hours access, contractor escort requirements, and security incident reporting \
             procedures.",
            &["access", "security", "policy", "visitors"],
            date(2021, 9, 1),
            date(2023, 9, 1),
            Some(date(2023, 9, 15)),
            Some(date(2026, 3, 15)),
        ),
        doc(
            "DOC-2024-007",
            "Ethanol 95% — Safety Data Sheet",
            SafetyDataSheet,
            "1.5",
            Approved,
            "Chemical Supplier (Ref)",
            Some("Safety Committee"),
            None,
            "Safety Data Sheet for Ethanol 95% as per GHS/REACH regulations. Includes hazard identification \
             (H225, H319), first aid measures, firefighting procedures, accidental release handling, storage \
             conditions, and disposal guidance.",
            &["SDS", "ethanol", "reagent", "GHS", "flammable"],
            date(2022, 11, 10),
            date(2024, 4, 1),
            Some(date(2024, 4, 1)),
            Some(date(2025, 4, 1)),
        ),
        doc(
            "DOC-2026-010",
            "CAPA Process — Corrective and Preventive Action",
            Sop,
            "1.0",
            Approved,
            "Quality Assurance",
            Some("Lab Manager"),
            Some("Lab Director"),
            "Defines the five-stage CAPA workflow (Identified → Investigation → Action Plan → Verification → \
             Closed), role responsibilities, priority guidance, and how the TheLab CAPA Kanban board is used to \
             track corrective and preventive actions end-to-end.",
            &["CAPA", "corrective action", "preventive action", "quality", "non-conformance", "workflow"],
            date(2026, 2, 18),
            date(2026, 2, 18),
            Some(date(2026, 2, 18)),
            Some(date(2027, 2, 18)),
        ),
        doc(
            "DOC-2026-009",
            "Document Management Process",
            Policy,
            "1.0",
            Approved,
            "Quality Assurance",
            Some("Lab Manager"),
            Some("Lab Director"),
            "Defines the end-to-end lifecycle of controlled documents within TheLab EDMS — from initial drafting \
             through peer review, formal approval, and eventual retirement. Specifies the responsibilities of \
             Authors, Reviewers, and Approvers, versioning conventions, and audit trail requirements.",
            &["EDMS", "document control", "process", "policy", "workflow", "QA"],
            date(2026, 2, 18),
            date(2026, 2, 18),
            Some(date(2026, 2, 18)),
            Some(date(2027, 2, 18)),
        ),
        doc(
            "DOC-2023-008",
            "Centrifuge Maintenance Protocol — Beckman Avanti J-26",
            Protocol,
            "1.1",
            Obsolete,
            "Dr. A. Moreau",
            None,
            None,
            "Quarterly maintenance protocol for the Beckman Coulter Avanti J-26 centrifuge. Instrument was \
             decommissioned in December 2023. Document retained for audit trail purposes.",
            &["centrifuge", "maintenance", "decommissioned"],
            date(2021, 5, 20),
            date(2023, 12, 1),
            None,
            None,
        ),
    ]
}

fn rev(id: &str, document_id: &str, version: &str, changed_by: &str, changed_at: NaiveDate, summary: &str) -> DocumentRevision {
    DocumentRevision {
        id: id.to_string(),
        document_id: document_id.to_string(),
        version: version.to_string(),
        changed_by: changed_by.to_string(),
        changed_at,
        summary: summary.to_string(),
    }
}

/// Revision history, newest first per document.
pub fn revisions() -> Vec<DocumentRevision> {
    vec![
        rev(
            "REV-001",
            "DOC-2024-001",
            "2.3",
            "Dr. S. Chen",
            date(2024, 1, 10),
            "Updated calibration frequency to daily for high-throughput mode. Added instrument startup checklist \
             (Appendix A).",
        ),
        rev(
            "REV-002",
            "DOC-2024-001",
            "2.2",
            "Dr. S. Chen",
            date(2023, 6, 15),
            "Revised sample preparation section to reduce cross-contamination risk. Updated internal standard \
             concentrations.",
        ),
        rev(
            "REV-003",
            "DOC-2024-001",
            "2.1",
            "Dr. M. Rousseau",
            date(2022, 11, 1),
            "Initial major revision following external ISO 17025 audit recommendations. Added measurement \
             uncertainty annex.",
        ),
        rev(
            "REV-004",
            "DOC-2024-002",
            "2.1",
            "Safety Committee",
            date(2024, 2, 1),
            "Added PPE requirements for concentrated acid spills. Updated emergency contact list and spill kit \
             locations.",
        ),
        rev(
            "REV-005",
            "DOC-2024-004",
            "1.2",
            "Quality Assurance",
            date(2024, 3, 1),
            "Added fields for expanded measurement uncertainty and calibration traceability chain per ISO \
             17025:2017 §6.4.6.",
        ),
        rev(
            "REV-006",
            "DOC-2024-004",
            "1.1",
            "Quality Assurance",
            date(2023, 4, 10),
            "Corrected date format inconsistency in column headers. Added digital signature field for approver.",
        ),
        rev(
            "REV-007",
            "DOC-2026-009",
            "1.0",
            "Quality Assurance",
            date(2026, 2, 18),
            "Initial release. Defines document lifecycle, roles, versioning rules, and audit trail requirements \
             for the TheLab EDMS.",
        ),
        rev(
            "REV-008",
            "DOC-2026-010",
            "1.0",
            "Quality Assurance",
            date(2026, 2, 18),
            "Initial release. Defines the five-stage CAPA workflow, role responsibilities, priority guidance, and \
             integration with the TheLab Kanban board.",
        ),
    ]
}

/// Open quality non-conformities.
pub fn non_conformities() -> Vec<NonConformity> {
    vec![
        NonConformity {
            id: "NC-2026-001".to_string(),
            title: "Balance #4 calibration expired".to_string(),
            description: "Analytical balance missed scheduled calibration by 3 days.".to_string(),
            source: NcSource::Audit,
            severity: NcSeverity::Minor,
            status: NcStatus::Open,
            date_opened: date(2026, 2, 5),
            assigned_to: Some("QA Manager".to_string()),
        },
        NonConformity {
            id: "NC-2026-002".to_string(),
            title: "Reagent lot tracking error".to_string(),
            description: "Lot number for Nitric Acid not recorded in LIMS for Batch B-492.".to_string(),
            source: NcSource::Audit,
            severity: NcSeverity::Minor,
            status: NcStatus::Investigating,
            date_opened: date(2026, 2, 7),
            assigned_to: Some("Lab Supervisor".to_string()),
        },
    ]
}

/// Reported safety incidents.
pub fn incidents() -> Vec<Incident> {
    vec![
        Incident {
            id: "1".to_string(),
            title: "Glassware breakage".to_string(),
            location: "Prep Room".to_string(),
            description: "Beaker slipped during cleaning.".to_string(),
            severity: IncidentSeverity::Minor,
            date: date(2024, 2, 8),
            status: IncidentStatus::Closed,
            reported_by: "S. Chen".to_string(),
            is_automated: false,
        },
        Incident {
            id: "2".to_string(),
            title: "Chemical Spill".to_string(),
            location: "Lab 3".to_string(),
            description: "Large acid spill".to_string(),
            severity: IncidentSeverity::Major,
            date: date(2026, 2, 9),
            status: IncidentStatus::Open,
            reported_by: "System Test".to_string(),
            is_automated: false,
        },
    ]
}

fn instrument(id: &str, name: &str, description: &str, category: Category, status: InstrumentStatus) -> Instrument {
    Instrument {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        category,
        image_url: None,
        status,
        created_at: Some(date(2024, 1, 8)),
    }
}

/// Bookable instruments.
pub fn instruments() -> Vec<Instrument> {
    vec![
        instrument(
            "inst-icpms",
            "ICP-MS Omega",
            "Inductively coupled plasma mass spectrometer for trace elemental analysis.",
            Category::Elemental,
            InstrumentStatus::Available,
        ),
        instrument(
            "inst-hplc",
            "HPLC Agilent 1260",
            "High-performance liquid chromatograph with DAD detector.",
            Category::Chromatography,
            InstrumentStatus::Available,
        ),
        instrument(
            "inst-gcms",
            "GC-MS Trace 1310",
            "Gas chromatograph coupled to a single quadrupole mass spectrometer.",
            Category::Chromatography,
            InstrumentStatus::Maintenance,
        ),
        instrument(
            "inst-ftir",
            "FTIR Nicolet iS50",
            "Fourier transform infrared spectrometer with ATR accessory.",
            Category::Spectroscopy,
            InstrumentStatus::Available,
        ),
        instrument(
            "inst-balance-4",
            "Analytical Balance #4",
            "Five-place analytical balance, weighing room.",
            Category::General,
            InstrumentStatus::Available,
        ),
    ]
}

/// Existing bookings.
pub fn bookings() -> Vec<Booking> {
    vec![
        Booking {
            id: "BKG-0001".to_string(),
            instrument_id: "inst-icpms".to_string(),
            user_name: "Dr. S. Chen".to_string(),
            start_time: datetime(2026, 2, 16, 9, 0),
            end_time: datetime(2026, 2, 16, 12, 0),
            purpose: Some("Heavy metals batch B-492".to_string()),
            created_at: Some(datetime(2026, 2, 10, 14, 22)),
        },
        Booking {
            id: "BKG-0002".to_string(),
            instrument_id: "inst-hplc".to_string(),
            user_name: "P. Lambert".to_string(),
            start_time: datetime(2026, 2, 16, 13, 0),
            end_time: datetime(2026, 2, 16, 17, 0),
            purpose: Some("Pesticide residue method validation".to_string()),
            created_at: Some(datetime(2026, 2, 11, 9, 5)),
        },
    ]
}

/// CAPA board.
pub fn boards() -> Vec<Board> {
    vec![Board {
        id: "BRD-001".to_string(),
        name: "CAPA".to_string(),
        category: Some(WorkCategory::Capa),
        created_at: Some(date(2026, 2, 18)),
    }]
}

/// The five CAPA stages.
pub fn columns() -> Vec<Column> {
    [
        ("COL-001", "Identified"),
        ("COL-002", "Investigation"),
        ("COL-003", "Action Plan"),
        ("COL-004", "Verification"),
        ("COL-005", "Closed"),
    ]
    .into_iter()
    .map(|(id, title)| Column {
        id: id.to_string(),
        title: title.to_string(),
    })
    .collect()
}

/// Open CAPA tasks.
pub fn tasks() -> Vec<Task> {
    vec![
        Task {
            id: "TASK-001".to_string(),
            title: "Root cause: balance #4 missed calibration".to_string(),
            owner: "QA Manager".to_string(),
            description: "Investigate why the calibration reminder for balance #4 was not raised (NC-2026-001)."
                .to_string(),
            priority: Priority::Medium,
            status: "COL-002".to_string(),
            board_id: "BRD-001".to_string(),
            category: Some(WorkCategory::Capa),
            due_date: Some(date(2026, 3, 1)),
            created_at: Some(date(2026, 2, 18)),
        },
        Task {
            id: "TASK-002".to_string(),
            title: "Enforce lot number entry in LIMS".to_string(),
            owner: "Lab Supervisor".to_string(),
            description: "Make reagent lot number mandatory at batch registration (NC-2026-002).".to_string(),
            priority: Priority::High,
            status: "COL-001".to_string(),
            board_id: "BRD-001".to_string(),
            category: Some(WorkCategory::Capa),
            due_date: None,
            created_at: Some(date(2026, 2, 18)),
        },
    ]
}
