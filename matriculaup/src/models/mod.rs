// Estructuras de datos principales: oferta académica (curso, sección, sesión),
// árbol de prerequisitos y los documentos que se serializan a JSON.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::extraccion::celdas::clave_normalizada;

pub mod hora;
pub mod malla;

pub use malla::{ClaveCiclo, CursoMalla, DocumentoMalla, GrupoCiclo, MetadataMalla, TipoCursoMalla};

/// Grupo horario de una sesión: sólo se comparan sesiones del mismo grupo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrupoHorario {
    Clases,
    Examenes,
}

/// Tipo de sesión tal como aparece en la columna "Tipo" del PDF.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum TipoSesion {
    Clase,
    Practica,
    Laboratorio,
    PracticaDirigida,
    PracticaCalificada,
    Taller,
    Final,
    Parcial,
    Recuperacion,
    Sustitutorio,
    Rezagado,
    Cancelada,
    Otro(String),
}

impl TipoSesion {
    /// Reconoce el tipo ignorando tildes, mayúsculas, puntos y espacios
    /// ("PRÁC. CALIFICADA" y "PRACCALIFICADA" son lo mismo).
    pub fn desde_texto(raw: &str) -> Self {
        let clave: String = clave_normalizada(raw).chars().filter(|c| c.is_alphanumeric()).collect();
        match clave.as_str() {
            "CLASE" | "CLASES" | "TEORIA" => TipoSesion::Clase,
            "PRACTICA" | "PRACTICAS" => TipoSesion::Practica,
            "LABORATORIO" | "LAB" => TipoSesion::Laboratorio,
            "PRACDIRIGIDA" | "PRACDIRIGI" | "PRACTICADIRIGIDA" => TipoSesion::PracticaDirigida,
            "PRACCALIFICADA" | "PRACTICACALIFICADA" => TipoSesion::PracticaCalificada,
            "TALLER" => TipoSesion::Taller,
            "FINAL" | "EXAMENFINAL" => TipoSesion::Final,
            "PARCIAL" | "EXAMENPARCIAL" => TipoSesion::Parcial,
            "RECUPERACION" => TipoSesion::Recuperacion,
            "EXSUSTITUTORIO" | "SUSTITUTORIO" => TipoSesion::Sustitutorio,
            "EXREZAGADO" | "REZAGADO" => TipoSesion::Rezagado,
            "CANCELADA" | "CANCELADO" => TipoSesion::Cancelada,
            _ => TipoSesion::Otro(raw.trim().to_string()),
        }
    }

    /// Token con el que se serializa (el mismo que usa el validador de esquema).
    pub fn token(&self) -> &str {
        match self {
            TipoSesion::Clase => "CLASE",
            TipoSesion::Practica => "PRÁCTICA",
            TipoSesion::Laboratorio => "LABORATORIO",
            TipoSesion::PracticaDirigida => "PRACDIRIGIDA",
            TipoSesion::PracticaCalificada => "PRACCALIFICADA",
            TipoSesion::Taller => "TALLER",
            TipoSesion::Final => "FINAL",
            TipoSesion::Parcial => "PARCIAL",
            TipoSesion::Recuperacion => "RECUPERACIÓN",
            TipoSesion::Sustitutorio => "EXSUSTITUTORIO",
            TipoSesion::Rezagado => "EXREZAGADO",
            TipoSesion::Cancelada => "CANCELADA",
            TipoSesion::Otro(raw) => raw,
        }
    }

    pub fn grupo(&self) -> Option<GrupoHorario> {
        match self {
            TipoSesion::Clase
            | TipoSesion::Practica
            | TipoSesion::Laboratorio
            | TipoSesion::PracticaDirigida
            | TipoSesion::PracticaCalificada
            | TipoSesion::Taller => Some(GrupoHorario::Clases),
            TipoSesion::Final
            | TipoSesion::Parcial
            | TipoSesion::Recuperacion
            | TipoSesion::Sustitutorio
            | TipoSesion::Rezagado => Some(GrupoHorario::Examenes),
            TipoSesion::Cancelada | TipoSesion::Otro(_) => None,
        }
    }
}

impl From<String> for TipoSesion {
    fn from(raw: String) -> Self {
        TipoSesion::desde_texto(&raw)
    }
}

impl From<TipoSesion> for String {
    fn from(tipo: TipoSesion) -> Self {
        tipo.token().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sesion {
    pub tipo: TipoSesion,
    pub dia: String,
    #[serde(with = "hora::hhmm")]
    pub hora_inicio: NaiveTime,
    #[serde(with = "hora::hhmm")]
    pub hora_fin: NaiveTime,
    #[serde(default)]
    pub aula: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seccion {
    pub seccion: String,
    #[serde(default)]
    pub docentes: Vec<String>,
    #[serde(default)]
    pub observaciones: String,
    #[serde(default)]
    pub sesiones: Vec<Sesion>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curso {
    pub codigo: String,
    pub nombre: String,
    pub creditos: String,
    #[serde(default)]
    pub prerequisitos: Option<Prerequisito>,
    #[serde(default)]
    pub secciones: Vec<Seccion>,
}

impl Curso {
    pub fn seccion(&self, etiqueta: &str) -> Option<&Seccion> {
        self.secciones.iter().find(|s| s.seccion == etiqueta)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Operador {
    And,
    Or,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefCurso {
    #[serde(rename = "code")]
    pub codigo: String,
    #[serde(rename = "name")]
    pub nombre: String,
}

/// Nodo del árbol de prerequisitos. Exactamente una de tres formas; la
/// forma sin parsear nunca aparece dentro de una expresión.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Prerequisito {
    Expresion { op: Operador, items: Vec<Prerequisito> },
    Hoja { items: Vec<RefCurso> },
    SinParsear { raw: String, parsed: bool },
}

impl Prerequisito {
    pub fn sin_parsear(raw: impl Into<String>) -> Self {
        Prerequisito::SinParsear { raw: raw.into(), parsed: false }
    }

    pub fn hoja(codigo: impl Into<String>, nombre: impl Into<String>) -> Self {
        Prerequisito::Hoja {
            items: vec![RefCurso { codigo: codigo.into(), nombre: nombre.into() }],
        }
    }

    pub fn es_estructurado(&self) -> bool {
        !matches!(self, Prerequisito::SinParsear { .. })
    }

    /// Códigos referenciados en el árbol, en orden de aparición.
    pub fn codigos(&self) -> Vec<&str> {
        match self {
            Prerequisito::Expresion { items, .. } => items.iter().flat_map(|p| p.codigos()).collect(),
            Prerequisito::Hoja { items } => items.iter().map(|r| r.codigo.as_str()).collect(),
            Prerequisito::SinParsear { .. } => Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataCursos {
    pub ciclo: String,
    pub fecha_extraccion: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuente: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentoCursos {
    pub metadata: MetadataCursos,
    pub cursos: Vec<Curso>,
}

/// Selección persistida por el usuario: sólo claves, se re-resuelve contra
/// el catálogo cargado.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeleccionGuardada {
    pub course_code: String,
    pub section_label: String,
}
