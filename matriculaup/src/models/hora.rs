// Horas de sesión: parseo tolerante y serialización como "HH:MM".
use chrono::NaiveTime;

/// Convierte "07:30", "7:30", "07.30" o "0730" a una hora del día.
pub fn parsear_hora(raw: &str) -> Option<NaiveTime> {
    let mut tok = raw.trim().replace('.', ":");
    if tok.is_empty() {
        return None;
    }
    if tok.len() == 4 && !tok.contains(':') && tok.chars().all(|c| c.is_ascii_digit()) {
        tok = format!("{}:{}", &tok[..2], &tok[2..]);
    }
    let parts: Vec<&str> = tok.split(':').collect();
    if parts.len() != 2 && parts.len() != 3 {
        return None;
    }
    let hh = parts[0].trim().parse::<u32>().ok()?;
    let mm = parts[1].trim().parse::<u32>().ok()?;
    NaiveTime::from_hms_opt(hh, mm, 0)
}

/// Separa un rango "07:30 - 09:30" en inicio y fin. Si el texto no trae
/// separador se interpreta como una sola hora de inicio.
pub fn parsear_rango(raw: &str) -> (Option<NaiveTime>, Option<NaiveTime>) {
    let limpio = raw.trim().replace('–', "-");
    match limpio.split_once('-') {
        Some((ini, fin)) => (parsear_hora(ini), parsear_hora(fin)),
        None => (parsear_hora(&limpio), None),
    }
}

pub fn formatear_hora(hora: &NaiveTime) -> String {
    hora.format("%H:%M").to_string()
}

pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(hora: &NaiveTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&super::formatear_hora(hora))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(d)?;
        super::parsear_hora(&raw).ok_or_else(|| de::Error::custom(format!("hora inválida: '{}'", raw)))
    }
}
