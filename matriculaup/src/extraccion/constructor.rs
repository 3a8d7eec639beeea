//! Máquina de estados que arma cursos a partir de filas clasificadas.
//!
//! Estado explícito:
//! - `curso_abierto`: curso en construcción (cabecera ya vista)
//! - `buffer_prerequisito`: fragmentos de texto aún sin parsear
//! - `seccion_abierta`: etiqueta a la que se agregan las continuaciones de sesión
//!
//! El buffer de prerequisito se vacía (`flush_prerequisito`) al ver la
//! primera sección del curso, al abrir el siguiente curso y al terminar el
//! documento. El estado persiste entre tablas y páginas: una tabla puede
//! empezar con continuaciones del curso de la página anterior.

use std::collections::HashMap;

use chrono::NaiveTime;

use tracing::{debug, warn};

use crate::models::{Curso, Prerequisito, Seccion, Sesion, TipoSesion};
use crate::models::hora::{parsear_hora, parsear_rango};

use super::celdas::{Celda, celda, normalizar_fila};
use super::clasificador::{CabeceraCurso, Clasificador, Columnas, DisenoFila, TipoFila};
use super::docentes::ParserDocentes;
use super::prerequisitos::{ParserPrerequisitos, es_prerequisito_truncado};

/// Contadores de calidad de una corrida.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Estadisticas {
    pub filas_totales: usize,
    pub errores: usize,
    pub advertencias: Vec<String>,
}

impl Estadisticas {
    pub fn tasa_error(&self) -> f64 {
        if self.filas_totales == 0 {
            return 0.0;
        }
        self.errores as f64 / self.filas_totales as f64
    }

    pub fn supera_umbral(&self, umbral: f64) -> bool {
        self.tasa_error() > umbral
    }

    pub fn registrar_error(&mut self, mensaje: String) {
        self.errores += 1;
        self.advertencias.push(mensaje);
    }
}

pub struct ConstructorCursos {
    clasificador: Clasificador,
    parser_prerequisitos: ParserPrerequisitos,
    parser_docentes: ParserDocentes,
    curso_abierto: Option<Curso>,
    buffer_prerequisito: Vec<String>,
    prerequisito_cerrado: bool,
    seccion_abierta: Option<String>,
    cursos: Vec<Curso>,
    estadisticas: Estadisticas,
}

impl Default for ConstructorCursos {
    fn default() -> Self {
        Self::new()
    }
}

impl ConstructorCursos {
    pub fn new() -> Self {
        ConstructorCursos {
            clasificador: Clasificador::new(),
            parser_prerequisitos: ParserPrerequisitos::new(),
            parser_docentes: ParserDocentes::new(),
            curso_abierto: None,
            buffer_prerequisito: Vec::new(),
            prerequisito_cerrado: false,
            seccion_abierta: None,
            cursos: Vec::new(),
            estadisticas: Estadisticas::default(),
        }
    }

    pub fn curso_abierto(&self) -> Option<&Curso> {
        self.curso_abierto.as_ref()
    }

    pub fn seccion_abierta(&self) -> Option<&str> {
        self.seccion_abierta.as_deref()
    }

    pub fn buffer_prerequisito(&self) -> &[String] {
        &self.buffer_prerequisito
    }

    pub fn estadisticas(&self) -> &Estadisticas {
        &self.estadisticas
    }

    /// Procesa una tabla completa: detecta su disposición y consume sus filas
    /// en orden.
    pub fn procesar_tabla(&mut self, tabla: &[Vec<Celda>]) {
        let filas: Vec<Vec<String>> = tabla.iter().map(|f| normalizar_fila(f)).collect();
        let diseno = self.clasificador.detectar_diseno(&filas);
        debug!(?diseno, filas = filas.len(), "tabla de oferta");
        for celdas in &filas {
            self.procesar_celdas(celdas, diseno);
        }
    }

    pub fn procesar_fila(&mut self, fila: &[Celda], diseno: DisenoFila) {
        let celdas = normalizar_fila(fila);
        self.procesar_celdas(&celdas, diseno);
    }

    fn procesar_celdas(&mut self, celdas: &[String], diseno: DisenoFila) {
        self.estadisticas.filas_totales += 1;
        let cols = diseno.columnas();
        match self.clasificador.clasificar(celdas, diseno) {
            TipoFila::CabeceraCurso(cabecera) => self.abrir_curso(cabecera),
            TipoFila::CabeceraSeccion => self.abrir_seccion(celdas, &cols, diseno),
            TipoFila::ContinuacionSesion => self.continuar_sesion(celdas, &cols, diseno),
            TipoFila::ContinuacionPrerequisito(fragmento) => self.agregar_fragmento(fragmento),
            TipoFila::Ruido => {}
        }
    }

    fn abrir_curso(&mut self, cabecera: CabeceraCurso) {
        self.cerrar_curso();
        self.curso_abierto = Some(Curso {
            codigo: cabecera.codigo,
            nombre: cabecera.nombre,
            creditos: cabecera.creditos,
            prerequisitos: None,
            secciones: Vec::new(),
        });
        if let Some(texto) = cabecera.prerequisito_en_linea {
            self.buffer_prerequisito.push(texto);
        }
    }

    fn agregar_fragmento(&mut self, fragmento: String) {
        // fuera de un curso o después de su primera sección no es prerequisito
        if self.curso_abierto.is_none() || self.prerequisito_cerrado {
            return;
        }
        self.buffer_prerequisito.push(fragmento);
    }

    fn abrir_seccion(&mut self, celdas: &[String], cols: &Columnas, diseno: DisenoFila) {
        if self.curso_abierto.is_none() {
            return;
        }
        self.flush_prerequisito();

        let etiqueta = celda(celdas, 0).to_string();
        let docentes = self.parser_docentes.separar(celda(celdas, cols.docentes));
        let observaciones = cols.observaciones.map(|i| celda(celdas, i).to_string()).unwrap_or_default();
        let sesion = self.leer_sesion(celdas, cols, diseno);

        let Some(curso) = self.curso_abierto.as_mut() else {
            return;
        };
        match curso.secciones.iter_mut().find(|s| s.seccion == etiqueta) {
            // la misma sección repetida tras un salto de página
            Some(existente) => {
                if existente.docentes.is_empty() {
                    existente.docentes = docentes;
                }
                if existente.observaciones.is_empty() {
                    existente.observaciones = observaciones;
                }
                existente.sesiones.extend(sesion);
            }
            None => curso.secciones.push(Seccion {
                seccion: etiqueta.clone(),
                docentes,
                observaciones,
                sesiones: sesion.into_iter().collect(),
            }),
        }
        self.seccion_abierta = Some(etiqueta);
    }

    fn continuar_sesion(&mut self, celdas: &[String], cols: &Columnas, diseno: DisenoFila) {
        let Some(etiqueta) = self.seccion_abierta.clone() else {
            return;
        };
        let Some(sesion) = self.leer_sesion(celdas, cols, diseno) else {
            return;
        };
        if let Some(seccion) = self
            .curso_abierto
            .as_mut()
            .and_then(|c| c.secciones.iter_mut().rev().find(|s| s.seccion == etiqueta))
        {
            seccion.sesiones.push(sesion);
        }
    }

    /// Sesión de la fila según las columnas de la disposición.
    fn leer_sesion(&self, celdas: &[String], cols: &Columnas, diseno: DisenoFila) -> Option<Sesion> {
        let (inicio, fin) = match (diseno, cols.hora_fin) {
            (DisenoFila::Extendida, Some(col_fin)) => {
                let (ini, fin_en_rango) = parsear_rango(celda(celdas, cols.hora_inicio));
                (ini, fin_en_rango.or_else(|| parsear_hora(celda(celdas, col_fin))))
            }
            _ => parsear_rango(celda(celdas, cols.hora_inicio)),
        };
        armar_sesion(
            celda(celdas, cols.tipo),
            celda(celdas, cols.dia),
            inicio,
            fin,
            celda(celdas, cols.aula),
        )
    }

    /// Vacía el buffer en el campo de prerequisito del curso abierto.
    pub fn flush_prerequisito(&mut self) {
        if self.prerequisito_cerrado {
            self.buffer_prerequisito.clear();
            return;
        }
        self.prerequisito_cerrado = true;
        let fragmentos = std::mem::take(&mut self.buffer_prerequisito);
        let Some(curso) = self.curso_abierto.as_mut() else {
            return;
        };
        let unido = fragmentos
            .iter()
            .map(|f| f.trim())
            .filter(|f| !f.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if unido.is_empty() {
            curso.prerequisitos = None;
            return;
        }

        if es_prerequisito_truncado(&unido) {
            let recorte: String = unido.chars().take(80).collect();
            warn!(codigo = %curso.codigo, prerequisito = %recorte, "prerequisito truncado");
            self.estadisticas
                .registrar_error(format!("{}: prerequisito truncado '{}'", curso.codigo, recorte));
            curso.prerequisitos = Some(Prerequisito::sin_parsear(unido));
            return;
        }

        let parseado = self.parser_prerequisitos.parsear(&unido);
        if !parseado.es_estructurado() {
            self.estadisticas
                .registrar_error(format!("{}: prerequisito sin estructura '{}'", curso.codigo, unido));
        }
        curso.prerequisitos = Some(parseado);
    }

    fn cerrar_curso(&mut self) {
        self.flush_prerequisito();
        if let Some(curso) = self.curso_abierto.take() {
            self.cursos.push(curso);
        }
        self.buffer_prerequisito.clear();
        self.prerequisito_cerrado = false;
        self.seccion_abierta = None;
    }

    /// Cierra el último curso y devuelve los cursos fusionados por código.
    pub fn terminar(mut self) -> (Vec<Curso>, Estadisticas) {
        self.cerrar_curso();
        (fusionar_cursos(self.cursos), self.estadisticas)
    }
}

/// Sesión completa, o `None` si le falta tipo, día, inicio o fin, o si el
/// fin no es posterior al inicio.
pub fn armar_sesion(
    tipo: &str,
    dia: &str,
    inicio: Option<NaiveTime>,
    fin: Option<NaiveTime>,
    aula: &str,
) -> Option<Sesion> {
    if tipo.is_empty() || dia.is_empty() {
        return None;
    }
    let (Some(hora_inicio), Some(hora_fin)) = (inicio, fin) else {
        debug!(tipo, dia, "sesión sin hora de inicio o de fin descartada");
        return None;
    };
    if hora_fin <= hora_inicio {
        debug!(tipo, dia, "sesión con fin anterior al inicio descartada");
        return None;
    }
    Some(Sesion {
        tipo: TipoSesion::desde_texto(tipo),
        dia: dia.to_uppercase(),
        hora_inicio,
        hora_fin,
        aula: (!aula.is_empty()).then(|| aula.to_string()),
    })
}

/// Une cursos con el mismo código (la primera aparición conserva nombre,
/// créditos y prerequisito) y, dentro de cada uno, secciones con la misma
/// etiqueta.
pub fn fusionar_cursos(cursos: Vec<Curso>) -> Vec<Curso> {
    let mut indice: HashMap<String, usize> = HashMap::new();
    let mut fusionados: Vec<Curso> = Vec::with_capacity(cursos.len());
    for curso in cursos {
        match indice.get(&curso.codigo) {
            Some(&i) => {
                fusionados[i].secciones.extend(curso.secciones);
            }
            None => {
                indice.insert(curso.codigo.clone(), fusionados.len());
                fusionados.push(curso);
            }
        }
    }
    for curso in &mut fusionados {
        curso.secciones = fusionar_secciones(std::mem::take(&mut curso.secciones));
    }
    fusionados
}

fn fusionar_secciones(secciones: Vec<Seccion>) -> Vec<Seccion> {
    let mut resultado: Vec<Seccion> = Vec::with_capacity(secciones.len());
    for seccion in secciones {
        match resultado.iter_mut().find(|s| s.seccion == seccion.seccion) {
            Some(existente) => {
                if existente.docentes.is_empty() {
                    existente.docentes = seccion.docentes;
                }
                if existente.observaciones.is_empty() {
                    existente.observaciones = seccion.observaciones;
                }
                existente.sesiones.extend(seccion.sesiones);
            }
            None => resultado.push(seccion),
        }
    }
    resultado
}
