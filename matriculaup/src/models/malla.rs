// Malla curricular: cursos agrupados por ciclo académico.
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TipoCursoMalla {
    Obligatorio,
    ObligatorioConcentracion,
    Electivo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CursoMalla {
    pub codigo: String,
    pub nombre: String,
    pub creditos: String,
    pub tipo: TipoCursoMalla,
}

/// Ciclo numérico (0 = nivelación) o etiqueta para los grupos planos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ClaveCiclo {
    Numero(u32),
    Etiqueta(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrupoCiclo {
    pub ciclo: ClaveCiclo,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub nombre: String,
    pub cursos: Vec<CursoMalla>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataMalla {
    pub plan: String,
    pub carrera: String,
    pub universidad: String,
    pub fecha_extraccion: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentoMalla {
    pub metadata: MetadataMalla,
    pub ciclos: Vec<GrupoCiclo>,
}
