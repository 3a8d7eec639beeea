//! Documento de entrada (páginas con tablas) y los recorridos que producen
//! los JSON de cursos y de malla curricular.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{MatriculaError, Result};
use crate::models::{
    ClaveCiclo, DocumentoCursos, DocumentoMalla, GrupoCiclo, MetadataCursos, MetadataMalla,
};

use super::celdas::Tabla;
use super::constructor::{ConstructorCursos, Estadisticas};
use super::malla::ReconstructorMalla;

pub const CICLO_POR_DEFECTO: &str = "2026-1";

/// Página tal como la entrega el detector de tablas.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagina {
    #[serde(default)]
    pub tablas: Vec<Tabla>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentoTablas {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuente: Option<String>,
    pub paginas: Vec<Pagina>,
}

impl DocumentoTablas {
    pub fn desde_json(texto: &str) -> Result<Self> {
        Ok(serde_json::from_str(texto)?)
    }

    pub fn leer_json(ruta: &Path) -> Result<Self> {
        let texto = fs::read_to_string(ruta).map_err(|e| MatriculaError::io(ruta, e))?;
        let mut doc = Self::desde_json(&texto)?;
        if doc.fuente.is_none() {
            doc.fuente = ruta.file_name().map(|n| n.to_string_lossy().into_owned());
        }
        Ok(doc)
    }

    pub fn total_filas(&self) -> usize {
        self.paginas.iter().flat_map(|p| &p.tablas).map(Vec::len).sum()
    }
}

/// Lee un documento de tablas según la extensión: `.json` (volcado del
/// detector) o libro de hoja de cálculo.
pub fn leer_documento(ruta: &Path) -> Result<DocumentoTablas> {
    let extension = ruta
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "json" => DocumentoTablas::leer_json(ruta),
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => crate::excel::leer_documento_excel(ruta),
        _ => Err(MatriculaError::TablaInvalida(ruta.display().to_string())),
    }
}

#[derive(Debug, Clone)]
pub struct ResultadoCursos {
    pub documento: DocumentoCursos,
    pub estadisticas: Estadisticas,
}

#[derive(Debug, Clone)]
pub struct ResultadoMalla {
    pub documento: DocumentoMalla,
    pub estadisticas: Estadisticas,
}

/// Identificación del plan de estudios que se escribe en la metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEstudios {
    pub plan: String,
    pub carrera: String,
    pub universidad: String,
}

impl Default for PlanEstudios {
    fn default() -> Self {
        PlanEstudios {
            plan: "Economia 2017".to_string(),
            carrera: "Economia".to_string(),
            universidad: "Universidad del Pacifico".to_string(),
        }
    }
}

/// Recorre todas las tablas en orden de página con un único constructor y
/// fusiona los cursos repetidos entre páginas. `umbral` es la tasa de error
/// sobre la que se advierte en el log.
pub fn extraer_cursos(doc: &DocumentoTablas, ciclo: &str, fecha: NaiveDate, umbral: f64) -> ResultadoCursos {
    let mut constructor = ConstructorCursos::new();
    for pagina in &doc.paginas {
        for tabla in &pagina.tablas {
            constructor.procesar_tabla(tabla);
        }
    }
    let (cursos, estadisticas) = constructor.terminar();

    let secciones: usize = cursos.iter().map(|c| c.secciones.len()).sum();
    let promedio = if cursos.is_empty() { 0.0 } else { secciones as f64 / cursos.len() as f64 };
    info!(
        ciclo,
        cursos = cursos.len(),
        secciones_promedio = %format!("{:.1}", promedio),
        advertencias = estadisticas.errores,
        "oferta extraída"
    );
    reportar_tasa(&estadisticas, umbral);

    ResultadoCursos {
        documento: DocumentoCursos {
            metadata: MetadataCursos {
                ciclo: ciclo.to_string(),
                fecha_extraccion: fecha,
                fuente: doc.fuente.clone(),
            },
            cursos,
        },
        estadisticas,
    }
}

/// Por página: tabla 0 = ciclos obligatorios, tabla 1 = concentración,
/// tabla 2 = electivos.
pub fn extraer_malla(
    doc: &DocumentoTablas,
    plan: &PlanEstudios,
    fecha: NaiveDate,
    umbral: f64,
) -> ResultadoMalla {
    let mut reconstructor = ReconstructorMalla::new();
    let mut ciclos = Vec::new();
    let mut concentracion = Vec::new();
    let mut electivos = Vec::new();

    for pagina in &doc.paginas {
        if let Some(tabla) = pagina.tablas.first() {
            ciclos.extend(reconstructor.reconstruir_ciclos(tabla));
        }
        if let Some(tabla) = pagina.tablas.get(1) {
            concentracion.extend(reconstructor.reconstruir_concentracion(tabla));
        }
        if let Some(tabla) = pagina.tablas.get(2) {
            electivos.extend(reconstructor.reconstruir_electivos(tabla));
        }
    }

    if !concentracion.is_empty() {
        ciclos.push(GrupoCiclo {
            ciclo: ClaveCiclo::Etiqueta("concentracion".to_string()),
            nombre: "Obligatorias de Concentracion".to_string(),
            cursos: concentracion,
        });
    }
    if !electivos.is_empty() {
        ciclos.push(GrupoCiclo {
            ciclo: ClaveCiclo::Etiqueta("electivos".to_string()),
            nombre: "Cursos Electivos".to_string(),
            cursos: electivos,
        });
    }

    let estadisticas = reconstructor.into_estadisticas();
    let total: usize = ciclos.iter().map(|g| g.cursos.len()).sum();
    info!(
        plan = %plan.plan,
        grupos = ciclos.len(),
        cursos = total,
        advertencias = estadisticas.errores,
        "malla extraída"
    );
    reportar_tasa(&estadisticas, umbral);

    ResultadoMalla {
        documento: DocumentoMalla {
            metadata: MetadataMalla {
                plan: plan.plan.clone(),
                carrera: plan.carrera.clone(),
                universidad: plan.universidad.clone(),
                fecha_extraccion: fecha,
            },
            ciclos,
        },
        estadisticas,
    }
}

/// Advierte si la tasa de error supera `umbral`; devuelve si lo hizo.
pub fn reportar_tasa(estadisticas: &Estadisticas, umbral: f64) -> bool {
    let supera = estadisticas.supera_umbral(umbral);
    if supera {
        warn!(
            tasa = %format!("{:.1}%", estadisticas.tasa_error() * 100.0),
            umbral = %format!("{:.1}%", umbral * 100.0),
            errores = estadisticas.errores,
            filas = estadisticas.filas_totales,
            "tasa de error excede el umbral"
        );
    }
    supera
}

/// Ciclo académico desde el nombre del archivo fuente
/// ("Oferta_2026-I_pregrado.pdf" -> "2026-1").
pub fn detectar_ciclo(nombre_archivo: &str) -> String {
    let stem = Path::new(nombre_archivo)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let patron = match Regex::new(r"(?i)(\d{4})[-_](II|I|2|1)(?:[-_\s]|$)") {
        Ok(p) => p,
        Err(_) => return CICLO_POR_DEFECTO.to_string(),
    };
    match patron.captures(&stem) {
        Some(caps) => {
            let periodo = match caps[2].to_uppercase().as_str() {
                "II" | "2" => "2",
                _ => "1",
            };
            format!("{}-{}", &caps[1], periodo)
        }
        None => CICLO_POR_DEFECTO.to_string(),
    }
}

pub fn nombre_archivo_cursos(ciclo: &str) -> String {
    format!("courses_{}.json", ciclo)
}

/// Escribe `valor` como JSON con sangría (UTF-8, sin escapar tildes) y
/// devuelve la ruta final.
pub fn guardar_json<T: Serialize>(valor: &T, dir: &Path, nombre: &str) -> Result<PathBuf> {
    fs::create_dir_all(dir).map_err(|e| MatriculaError::io(dir, e))?;
    let ruta = dir.join(nombre);
    let texto = serde_json::to_string_pretty(valor)?;
    fs::write(&ruta, texto).map_err(|e| MatriculaError::io(&ruta, e))?;
    Ok(ruta)
}

/// Carga un catálogo de cursos previamente extraído.
pub fn leer_catalogo(ruta: &Path) -> Result<DocumentoCursos> {
    let texto = fs::read_to_string(ruta).map_err(|e| MatriculaError::io(ruta, e))?;
    Ok(serde_json::from_str(&texto)?)
}
