//! Cursos EFE (experiencias formativas estudiantiles) desde su tabla de oferta.
//!
//! Filas de sección: `[secc, facilitador, tipo, día o fecha, inicio, fin, cupos, detalle]`.
//! Las secciones `CLASE` traen día y horas; las de `INICIO`/`FIN` traen fechas
//! ("17-Mar") que terminan en observaciones junto al detalle, sin sesiones.
//! Cada curso sale con la forma estándar: nombre con prefijo `[EFE]`, un
//! crédito y sin prerequisito estructurado.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use tracing::{debug, info, trace};

use crate::models::hora::parsear_hora;
use crate::models::{Curso, DocumentoCursos, MetadataCursos, Seccion};

use super::celdas::{Celda, celda, fila_vacia, normalizar_fila, unir_lineas};
use super::constructor::{Estadisticas, armar_sesion, fusionar_cursos};
use super::docentes::ParserDocentes;
use super::documento::{DocumentoTablas, ResultadoCursos, reportar_tasa};

pub const PREFIJO_EFE: &str = "[EFE]";
const CREDITOS_EFE: &str = "1";
const LARGO_MINIMO_REQUISITO: usize = 40;

const MESES: [(&str, u32); 12] = [
    ("ENE", 1),
    ("FEB", 2),
    ("MAR", 3),
    ("ABR", 4),
    ("MAY", 5),
    ("JUN", 6),
    ("JUL", 7),
    ("AGO", 8),
    ("SEP", 9),
    ("OCT", 10),
    ("NOV", 11),
    ("DIC", 12),
];

const COL_FACILITADOR: usize = 1;
const COL_TIPO: usize = 2;
const COL_DIA_O_FECHA: usize = 3;
const COL_INICIO: usize = 4;
const COL_FIN: usize = 5;
const COL_DETALLE_CLASE: usize = 7;
const COL_DETALLE_FECHAS: usize = 5;

/// Sección en construcción; las fechas se vuelcan a observaciones al cerrar.
#[derive(Debug)]
struct SeccionEfe {
    seccion: Seccion,
    fecha_inicio: Option<NaiveDate>,
    fecha_fin: Option<NaiveDate>,
    detalle: String,
}

impl SeccionEfe {
    fn cerrar(mut self) -> Seccion {
        let fechas = match (self.fecha_inicio, self.fecha_fin) {
            (None, None) => String::new(),
            (inicio, fin) => format!(
                "{} → {}",
                inicio.map(|f| f.to_string()).unwrap_or_default(),
                fin.map(|f| f.to_string()).unwrap_or_default()
            ),
        };
        self.seccion.observaciones = [fechas, self.detalle]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" | ");
        self.seccion
    }
}

#[derive(Debug)]
struct CursoEfe {
    curso: Curso,
    secciones: Vec<SeccionEfe>,
}

pub struct ReconstructorEfe {
    cabecera: Regex,
    etiqueta_seccion: Regex,
    encabezado_tipo: Regex,
    omitir: Regex,
    parser_docentes: ParserDocentes,
    anio: i32,
    tipo_actual: String,
    abierto: Option<CursoEfe>,
    seccion_abierta: Option<String>,
    cursos: Vec<Curso>,
    por_tipo: BTreeMap<String, usize>,
    estadisticas: Estadisticas,
}

impl ReconstructorEfe {
    /// `anio` completa las fechas "DD-Mes" del PDF.
    pub fn new(anio: i32) -> Self {
        ReconstructorEfe {
            cabecera: Regex::new(r"(?s)^(\d{5,7}[_A-Z]*)\s*[-–]\s*(.+)").expect("patrón de cabecera EFE válido"),
            etiqueta_seccion: Regex::new(r"^[A-Z]\d?$").expect("patrón de sección EFE válido"),
            encabezado_tipo: Regex::new(r"(?i)^EFE\s+\w").expect("patrón de tipo EFE válido"),
            omitir: Regex::new(r"(?i)^(?:SECC\.?\s*$|PREREQUISITO|REQUISITO|TALLERES\s+DE)")
                .expect("patrón de filas omitidas válido"),
            parser_docentes: ParserDocentes::new(),
            anio,
            tipo_actual: String::new(),
            abierto: None,
            seccion_abierta: None,
            cursos: Vec::new(),
            por_tipo: BTreeMap::new(),
            estadisticas: Estadisticas::default(),
        }
    }

    pub fn procesar_tabla(&mut self, tabla: &[Vec<Celda>]) {
        for fila in tabla {
            self.procesar_fila(fila);
        }
    }

    pub fn procesar_fila(&mut self, fila: &[Celda]) {
        self.estadisticas.filas_totales += 1;
        let celdas = normalizar_fila(fila);
        if fila_vacia(&celdas) {
            return;
        }
        let primera = celda(&celdas, 0);
        let llenas = celdas.iter().filter(|c| !c.is_empty()).count();

        if self.encabezado_tipo.is_match(primera) && llenas <= 2 {
            self.tipo_actual = unir_lineas(
                &celdas.iter().filter(|c| !c.is_empty()).cloned().collect::<Vec<_>>().join(" "),
            );
            return;
        }
        if self.omitir.is_match(primera) {
            return;
        }
        if primera.chars().count() > LARGO_MINIMO_REQUISITO
            && llenas <= 3
            && !self.cabecera.is_match(primera)
            && !self.etiqueta_seccion.is_match(primera)
        {
            trace!(texto = primera, "requisito de EFE");
            return;
        }

        if let Some(caps) = self.cabecera.captures(primera) {
            let nombre = caps[2].lines().next().unwrap_or_default().trim().to_string();
            self.abrir_curso(caps[1].to_string(), nombre);
            return;
        }
        if self.abierto.is_none() {
            return;
        }

        if self.etiqueta_seccion.is_match(primera) {
            self.abrir_seccion(&celdas);
        } else if primera.is_empty() {
            self.continuar_seccion(&celdas);
        }
    }

    fn abrir_curso(&mut self, codigo: String, nombre: String) {
        self.cerrar_curso();
        *self.por_tipo.entry(self.tipo_actual.clone()).or_default() += 1;
        self.abierto = Some(CursoEfe {
            curso: Curso {
                codigo,
                nombre: format!("{} {}", PREFIJO_EFE, nombre),
                creditos: CREDITOS_EFE.to_string(),
                prerequisitos: None,
                secciones: Vec::new(),
            },
            secciones: Vec::new(),
        });
    }

    fn abrir_seccion(&mut self, celdas: &[String]) {
        let etiqueta = celda(celdas, 0).to_string();
        let tipo = celda(celdas, COL_TIPO).to_uppercase();
        let docentes = self.parser_docentes.separar(celda(celdas, COL_FACILITADOR));
        let detalle = if tipo == "CLASE" {
            celda(celdas, COL_DETALLE_CLASE)
        } else {
            celda(celdas, COL_DETALLE_FECHAS)
        };
        let detalle = limpiar_detalle(detalle);
        self.seccion_abierta = Some(etiqueta.clone());

        let Some(abierto) = self.abierto.as_mut() else {
            return;
        };
        if !abierto.secciones.iter().any(|s| s.seccion.seccion == etiqueta) {
            abierto.secciones.push(SeccionEfe {
                seccion: Seccion { seccion: etiqueta, docentes, observaciones: String::new(), sesiones: Vec::new() },
                fecha_inicio: None,
                fecha_fin: None,
                detalle,
            });
        }
        self.aplicar_fila(celdas, &tipo);
    }

    fn continuar_seccion(&mut self, celdas: &[String]) {
        if self.seccion_abierta.is_none() {
            return;
        }
        let tipo = celda(celdas, COL_TIPO).to_uppercase();
        self.aplicar_fila(celdas, &tipo);
    }

    /// Sesión o fecha de la fila sobre la sección abierta.
    fn aplicar_fila(&mut self, celdas: &[String], tipo: &str) {
        let anio = self.anio;
        let Some(etiqueta) = self.seccion_abierta.as_deref() else {
            return;
        };
        let Some(abierto) = self.abierto.as_mut() else {
            return;
        };
        let Some(seccion) = abierto.secciones.iter_mut().rev().find(|s| s.seccion.seccion == etiqueta) else {
            return;
        };
        let valor = celda(celdas, COL_DIA_O_FECHA);
        match tipo {
            "CLASE" => {
                let sesion = armar_sesion(
                    tipo,
                    valor,
                    parsear_hora(celda(celdas, COL_INICIO)),
                    parsear_hora(celda(celdas, COL_FIN)),
                    "",
                );
                match sesion {
                    Some(s) => seccion.seccion.sesiones.push(s),
                    None => {
                        let codigo = abierto.curso.codigo.clone();
                        self.estadisticas
                            .registrar_error(format!("{}-{}: sesión CLASE incompleta", codigo, etiqueta));
                    }
                }
            }
            "INICIO" => seccion.fecha_inicio = parsear_fecha(valor, anio).or(seccion.fecha_inicio),
            "FIN" => seccion.fecha_fin = parsear_fecha(valor, anio).or(seccion.fecha_fin),
            otro => debug!(tipo = otro, "tipo de sesión EFE sin horario"),
        }
    }

    fn cerrar_curso(&mut self) {
        if let Some(abierto) = self.abierto.take() {
            let mut curso = abierto.curso;
            curso.secciones = abierto.secciones.into_iter().map(SeccionEfe::cerrar).collect();
            self.cursos.push(curso);
        }
        self.seccion_abierta = None;
    }

    pub fn estadisticas(&self) -> &Estadisticas {
        &self.estadisticas
    }

    /// Cierra el último curso y fusiona los repetidos entre páginas.
    pub fn terminar(mut self) -> (Vec<Curso>, Estadisticas) {
        self.cerrar_curso();
        for (tipo, total) in &self.por_tipo {
            debug!(tipo = %tipo, cursos = total, "cursos EFE por tipo");
        }
        (fusionar_cursos(self.cursos), self.estadisticas)
    }
}

/// "17-Mar" o "9/abr" con el año dado.
pub fn parsear_fecha(texto: &str, anio: i32) -> Option<NaiveDate> {
    let (dia, resto) = texto.trim().split_once(['-', '/'])?;
    let dia = dia.trim().parse::<u32>().ok()?;
    let mes: String = resto.trim().chars().take(3).collect::<String>().to_uppercase();
    let (_, numero) = MESES.iter().find(|(nombre, _)| *nombre == mes)?;
    NaiveDate::from_ymd_opt(anio, *numero, dia)
}

/// Quita íconos y colapsa espacios.
fn limpiar_detalle(texto: &str) -> String {
    let sin_iconos: String = texto
        .chars()
        .filter(|c| !matches!(*c as u32, 0x1F300..=0x1F9FF | 0x2600..=0x26FF | 0x2700..=0x27BF))
        .collect();
    unir_lineas(&sin_iconos)
}

pub fn nombre_archivo_efe(ciclo: &str) -> String {
    format!("efe_courses_{}.json", ciclo)
}

/// Recorre todas las tablas del documento EFE y devuelve cursos con la forma
/// estándar. El año de las fechas sale del ciclo ("2026-1").
pub fn extraer_efe(doc: &DocumentoTablas, ciclo: &str, fecha: NaiveDate, umbral: f64) -> ResultadoCursos {
    let anio = ciclo.get(..4).and_then(|a| a.parse::<i32>().ok()).unwrap_or_else(|| fecha.year());
    let mut reconstructor = ReconstructorEfe::new(anio);
    for pagina in &doc.paginas {
        for tabla in &pagina.tablas {
            reconstructor.procesar_tabla(tabla);
        }
    }
    let (cursos, estadisticas) = reconstructor.terminar();
    let sin_horario = cursos.iter().flat_map(|c| &c.secciones).filter(|s| s.sesiones.is_empty()).count();
    info!(ciclo, cursos = cursos.len(), secciones_sin_horario = sin_horario, "oferta EFE extraída");
    reportar_tasa(&estadisticas, umbral);

    ResultadoCursos {
        documento: DocumentoCursos {
            metadata: MetadataCursos { ciclo: ciclo.to_string(), fecha_extraccion: fecha, fuente: doc.fuente.clone() },
            cursos,
        },
        estadisticas,
    }
}
