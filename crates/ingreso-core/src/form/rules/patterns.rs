//! Common regex patterns and lookup tables for admission form extraction.

use lazy_static::lazy_static;
use regex::Regex;

/// Administrative phrases that look like names on a form but are not.
///
/// Longer phrases come first so the stripping regex removes them whole.
pub const NAME_DENYLIST: &[&str] = &[
    "LEY DE URGENCIA",
    "LEY URGENCIA",
    "HOSPITALIZACIÓN",
    "HOSPITALIZACION",
    "FICHA CLÍNICA",
    "FICHA CLINICA",
    "TIPO DE PACIENTE",
    "TIPO PACIENTE",
    "DATOS DEL PACIENTE",
    "DATOS PACIENTE",
    "FORMULARIO",
    "CONVENCIONAL",
    "PROCEDENCIA",
    "ADMISIÓN",
    "ADMISION",
    "INGRESO",
    "URGENCIA",
];

/// Ordered insurer synonym table: OCR spelling -> canonical plan.
///
/// Order matters for the whole-text scan: the first key found wins.
pub const PREVISION_SYNONYMS: &[(&str, &str)] = &[
    ("FONASA", FONASA),
    ("CAPREDENA", FONASA),
    ("DIPRECA", FONASA),
    ("BANMEDICA", "Isapre Banmédica"),
    ("BANMÉDICA", "Isapre Banmédica"),
    ("BAN MEDICA", "Isapre Banmédica"),
    ("CRUZ BLANCA", "Isapre Cruz Blanca"),
    ("CRUZBLANCA", "Isapre Cruz Blanca"),
    ("CRUZ DEL NORTE", "Isapre Cruz del Norte"),
    ("COLMENA", "Isapre Colmena"),
    ("CONSALUD", "Isapre Consalud"),
    ("NUEVA MASVIDA", "Isapre Nueva Masvida"),
    ("NUEVA MAS VIDA", "Isapre Nueva Masvida"),
    ("MASVIDA", "Isapre Nueva Masvida"),
    ("MAS VIDA", "Isapre Nueva Masvida"),
    ("VIDA TRES", "Isapre Vida Tres"),
    ("VIDATRES", "Isapre Vida Tres"),
    ("VIDATRE", "Isapre Vida Tres"),
    ("ISAPRE ESENCIAL", "Isapre Esencial"),
];

/// Canonical name of the public insurer.
pub const FONASA: &str = "Fonasa";

lazy_static! {
    // Name patterns
    pub static ref NAME_BLOCK_LABEL: Regex = Regex::new(
        r"(?is)^\s*(?:nombre\s+y\s+apellidos?|nombre\s+(?:del\s+)?paciente|nombres?|paciente|titular)\b[\s:.\-]*(.*)$"
    ).unwrap();

    pub static ref NAME_LABELED: Regex = Regex::new(
        r"(?i)\b(?:nombre\s+y\s+apellidos?|nombre\s+(?:del\s+)?paciente|nombres?|paciente|titular)\b[ \t:.\-]*(?:\n[ \t]*)?([^\n]+?)(?:\bRUT\b|\bEDAD\b|\bSEXO\b|\n|$)"
    ).unwrap();

    pub static ref NAME_UPPERCASE_LINE: Regex = Regex::new(
        r"^[A-ZÁÉÍÓÚÑÜ ]{10,50}$"
    ).unwrap();

    pub static ref NAME_DELIMITER: Regex = Regex::new(
        r"(?i)\b(?:RUT|EDAD|SEXO|FECHA|FONO|DIRECCI[OÓ]N|ASEGURADOR|PREVISI[OÓ]N)\b"
    ).unwrap();

    pub static ref NAME_DENYLIST_PATTERN: Regex = Regex::new(&format!(
        r"(?i)\b(?:{})\b",
        NAME_DENYLIST
            .iter()
            .map(|p| regex::escape(p).replace(' ', r"\s+"))
            .collect::<Vec<_>>()
            .join("|")
    )).unwrap();

    // RUT (Chilean national ID): 7.654.321-6 or 7654321-6
    pub static ref RUT_PATTERN: Regex = Regex::new(
        r"\b(\d{1,2}\.\d{3}\.\d{3}-[\dkK]|\d{7,8}-[\dkK])\b"
    ).unwrap();

    // Age patterns
    pub static ref AGE_YEARS: Regex = Regex::new(
        r"(?i)\b(\d{1,3})\s*A[ÑN]OS\b"
    ).unwrap();

    pub static ref AGE_LABELED: Regex = Regex::new(
        r"(?i)\bEDAD\s*:?\s*(\d{1,3})\b"
    ).unwrap();

    // Insurance plan
    pub static ref PREVISION_LABELED: Regex = Regex::new(
        r"(?i)\b(?:ASEGURADOR\s*/\s*PLAN|ASEGURADOR|PREVISI[OÓ]N)\b[ \t:]*([^\n]+?)(?:\bFECHA\b|\bFAMILIAR\b|\bPROCEDENCIA\b|\bPLAN\b|\n|$)"
    ).unwrap();

    // Dates
    pub static ref DATE_LABELED: Regex = Regex::new(
        r"(?i)\b(?:ingreso|admisi[oó]n|fecha)\b[\s:]*(\d{1,2})[/\-](\d{1,2})[/\-](\d{4})\b"
    ).unwrap();

    pub static ref DATE_DMY: Regex = Regex::new(
        r"\b(\d{1,2})[/\-](\d{1,2})[/\-](\d{4})\b"
    ).unwrap();

    pub static ref DATE_SHAPE: Regex = Regex::new(
        r"^\d{2}/\d{2}/\d{4}$"
    ).unwrap();

    // Bed patterns, in try-order
    pub static ref BED_LABELED: Regex = Regex::new(
        r"(?i)\b(?:cama|pieza|habitaci[oó]n)\b(?:[ \t]*(?::|#|N[°º]\.?))?[ \t]*([A-Z0-9][A-Z0-9\-]*)"
    ).unwrap();

    pub static ref BED_BARE: Regex = Regex::new(
        r"\b([A-Z]{1,2}\d{2,3})\b"
    ).unwrap();

    pub static ref BED_PIEZA: Regex = Regex::new(
        r"(?i)\bPIEZA[ \t]+([A-Z0-9][A-Z0-9\-]*)"
    ).unwrap();

    pub static ref BED_SHAPE: Regex = Regex::new(
        r"^[A-Z]{1,2}\d{2,3}$"
    ).unwrap();

    pub static ref BED_ID_LIKE: Regex = Regex::new(
        r"^\d{7}"
    ).unwrap();
}
