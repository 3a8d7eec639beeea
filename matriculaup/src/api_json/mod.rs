use serde::{Deserialize, Serialize};

use crate::algorithm::conflict::detectar_conflictos;
use crate::extraccion::celdas::creditos_a_numero;
use crate::extraccion::constructor::Estadisticas;
use crate::extraccion::documento::DocumentoTablas;
use crate::horario::{huella_selecciones, resolver_selecciones};
use crate::models::{Curso, DocumentoCursos, SeleccionGuardada};

/// Selecciones enviadas a `POST /conflictos`.
///
/// Se aceptan dos formas equivalentes:
/// ```json
/// [{"course_code": "138201", "section_label": "A"}]
/// ```
/// ```json
/// {"selecciones": [{"course_code": "138201", "section_label": "A"}]}
/// ```
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EntradaSelecciones {
	Lista(Vec<SeleccionGuardada>),
	Objeto { selecciones: Vec<SeleccionGuardada> },
}

pub fn parse_selecciones(json_str: &str) -> Result<Vec<SeleccionGuardada>, serde_json::Error> {
	Ok(match serde_json::from_str::<EntradaSelecciones>(json_str)? {
		EntradaSelecciones::Lista(v) => v,
		EntradaSelecciones::Objeto { selecciones } => selecciones,
	})
}

/// Cuerpo de `POST /extraer/cursos`: el volcado del detector de tablas más el
/// ciclo opcional (por defecto se deduce de `fuente`).
#[derive(Debug, Deserialize)]
pub struct ExtraerCursosRequest {
	#[serde(default)]
	pub ciclo: Option<String>,
	#[serde(flatten)]
	pub documento: DocumentoTablas,
}

#[derive(Debug, Serialize)]
pub struct ExtraccionResponse {
	pub filas_totales: usize,
	pub errores: usize,
	pub tasa_error: f64,
	pub supera_umbral: bool,
	pub advertencias: Vec<String>,
	pub documento: DocumentoCursos,
}

impl ExtraccionResponse {
	pub fn new(documento: DocumentoCursos, estadisticas: Estadisticas, umbral: f64) -> Self {
		ExtraccionResponse {
			filas_totales: estadisticas.filas_totales,
			errores: estadisticas.errores,
			tasa_error: estadisticas.tasa_error(),
			supera_umbral: estadisticas.supera_umbral(umbral),
			advertencias: estadisticas.advertencias,
			documento,
		}
	}
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictoDto {
	pub codigo_a: String,
	pub nombre_a: String,
	pub codigo_b: String,
	pub nombre_b: String,
}

/// Resultado de evaluar una selección contra el catálogo cargado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluacionHorario {
	pub seleccionadas: Vec<SeleccionGuardada>,
	pub descartadas: Vec<SeleccionGuardada>,
	pub creditos: f64,
	pub conflictos: Vec<ConflictoDto>,
	// hex para no perder precisión en clientes JS
	pub huella: String,
}

pub fn evaluar_horario(catalogo: &[Curso], guardadas: &[SeleccionGuardada]) -> EvaluacionHorario {
	let (seleccionadas, descartadas): (Vec<SeleccionGuardada>, Vec<SeleccionGuardada>) = guardadas
		.iter()
		.cloned()
		.partition(|g| !resolver_selecciones(catalogo, std::slice::from_ref(g)).is_empty());

	let resueltas = resolver_selecciones(catalogo, &seleccionadas);
	let conflictos = detectar_conflictos(&resueltas)
		.into_iter()
		.map(|(a, b)| ConflictoDto {
			codigo_a: a.codigo.clone(),
			nombre_a: a.nombre.clone(),
			codigo_b: b.codigo.clone(),
			nombre_b: b.nombre.clone(),
		})
		.collect();

	EvaluacionHorario {
		creditos: resueltas.iter().map(|(c, _)| creditos_a_numero(&c.creditos)).sum(),
		huella: format!("{:016x}", huella_selecciones(&seleccionadas)),
		seleccionadas,
		descartadas,
		conflictos,
	}
}

/// Fila de resultado de `GET /cursos`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CursoResumen {
	pub codigo: String,
	pub nombre: String,
	pub creditos: String,
	pub secciones: Vec<String>,
}

impl From<&Curso> for CursoResumen {
	fn from(c: &Curso) -> Self {
		CursoResumen {
			codigo: c.codigo.clone(),
			nombre: c.nombre.clone(),
			creditos: c.creditos.clone(),
			secciones: c.secciones.iter().map(|s| s.seccion.clone()).collect(),
		}
	}
}
