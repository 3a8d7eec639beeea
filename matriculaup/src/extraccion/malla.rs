//! Reconstrucción de la malla curricular desde las tablas del plan de estudios.
//!
//! Tabla de obligatorios: `[ciclo, código, nombre, DA, T, P, créditos, ...]`.
//! La fila que abre un ciclo trae en la celda de código *todos* los códigos
//! del ciclo separados por saltos de línea; las filas siguientes (ciclo vacío)
//! sólo traen el nombre y toman el siguiente código de la cola de pendientes.
//! Si una fila trae su propio código, ese manda y la cola no avanza.
//!
//! Las tablas de obligatorios de concentración y de electivos son listas
//! planas: `[código, nombre, DA, T, P, créditos]`.

use std::collections::VecDeque;

use regex::Regex;
use tracing::warn;

use crate::models::{ClaveCiclo, CursoMalla, GrupoCiclo, TipoCursoMalla};

use super::celdas::{Celda, celda, fila_vacia, normalizar_creditos, normalizar_fila};
use super::constructor::Estadisticas;

const NUMEROS_ROMANOS: [(&str, u32); 11] = [
    ("0", 0),
    ("I", 1),
    ("II", 2),
    ("III", 3),
    ("IV", 4),
    ("V", 5),
    ("VI", 6),
    ("VII", 7),
    ("VIII", 8),
    ("IX", 9),
    ("X", 10),
];
const CICLO_MAXIMO: u32 = 20;

const COL_CICLO: usize = 0;
const COL_CODIGO: usize = 1;
const COL_NOMBRE: usize = 2;
const COL_CREDITOS: usize = 6;

const COL_PLANA_CODIGO: usize = 0;
const COL_PLANA_NOMBRE: usize = 1;
const COL_PLANA_CREDITOS: usize = 5;

/// Ciclo en construcción con su cola de códigos pendientes.
#[derive(Debug)]
struct CicloAbierto {
    numero: u32,
    pendientes: VecDeque<String>,
    cursos: Vec<CursoMalla>,
}

impl CicloAbierto {
    fn cerrar(self) -> Option<GrupoCiclo> {
        (!self.cursos.is_empty()).then(|| GrupoCiclo {
            ciclo: ClaveCiclo::Numero(self.numero),
            nombre: String::new(),
            cursos: self.cursos,
        })
    }
}

pub struct ReconstructorMalla {
    codigo: Regex,
    estadisticas: Estadisticas,
}

impl Default for ReconstructorMalla {
    fn default() -> Self {
        Self::new()
    }
}

impl ReconstructorMalla {
    pub fn new() -> Self {
        ReconstructorMalla {
            codigo: Regex::new(r"^[0-9][A-Z0-9]{5}$").expect("patrón de código de malla válido"),
            estadisticas: Estadisticas::default(),
        }
    }

    pub fn estadisticas(&self) -> &Estadisticas {
        &self.estadisticas
    }

    pub fn into_estadisticas(self) -> Estadisticas {
        self.estadisticas
    }

    pub fn es_codigo(&self, texto: &str) -> bool {
        self.codigo.is_match(texto.trim())
    }

    /// Códigos válidos de una celda con varias líneas.
    fn extraer_codigos(&self, texto: &str) -> Vec<String> {
        texto
            .lines()
            .map(str::trim)
            .filter(|l| self.es_codigo(l))
            .map(String::from)
            .collect()
    }

    /// Tabla de cursos obligatorios agrupados por ciclo.
    pub fn reconstruir_ciclos(&mut self, tabla: &[Vec<Celda>]) -> Vec<GrupoCiclo> {
        let mut grupos = Vec::new();
        let mut abierto: Option<CicloAbierto> = None;

        for fila in tabla {
            self.estadisticas.filas_totales += 1;
            let celdas = normalizar_fila(fila);
            if fila_vacia(&celdas) {
                continue;
            }
            let marca = celda(&celdas, COL_CICLO);
            let celda_codigo = celda(&celdas, COL_CODIGO);
            let nombre = celda(&celdas, COL_NOMBRE);
            let creditos = normalizar_creditos(celda(&celdas, COL_CREDITOS));

            if marca.eq_ignore_ascii_case("ciclo") || nombre.to_uppercase().contains("TOTAL") {
                continue;
            }

            if let Some(numero) = parsear_ciclo(marca) {
                if let Some(grupo) = abierto.take().and_then(CicloAbierto::cerrar) {
                    grupos.push(grupo);
                }
                let mut ciclo = CicloAbierto {
                    numero,
                    pendientes: self.extraer_codigos(celda_codigo).into(),
                    cursos: Vec::new(),
                };
                // la fila que abre el ciclo es también su primer curso
                if !nombre.is_empty() {
                    let codigo = ciclo.pendientes.pop_front().unwrap_or_default();
                    self.agregar(&mut ciclo, codigo, nombre, creditos);
                }
                abierto = Some(ciclo);
            } else if let Some(ciclo) = abierto.as_mut() {
                if nombre.is_empty() {
                    continue;
                }
                let codigo = if self.es_codigo(celda_codigo) {
                    celda_codigo.to_string()
                } else {
                    ciclo.pendientes.pop_front().unwrap_or_default()
                };
                self.agregar(ciclo, codigo, nombre, creditos);
            }
        }

        if let Some(grupo) = abierto.and_then(CicloAbierto::cerrar) {
            grupos.push(grupo);
        }
        grupos
    }

    fn agregar(&mut self, ciclo: &mut CicloAbierto, codigo: String, nombre: &str, creditos: String) {
        if codigo.is_empty() {
            warn!(ciclo = ciclo.numero, nombre, "curso de malla sin código disponible");
            self.estadisticas
                .registrar_error(format!("ciclo {}: '{}' sin código", ciclo.numero, nombre));
        }
        ciclo.cursos.push(CursoMalla {
            codigo,
            nombre: nombre.to_string(),
            creditos,
            tipo: TipoCursoMalla::Obligatorio,
        });
    }

    /// Obligatorios de concentración: códigos, nombres y créditos en celdas
    /// multilínea alineadas por posición.
    pub fn reconstruir_concentracion(&mut self, tabla: &[Vec<Celda>]) -> Vec<CursoMalla> {
        let mut cursos = Vec::new();
        for fila in tabla {
            self.estadisticas.filas_totales += 1;
            let celdas = normalizar_fila(fila);
            if fila_vacia(&celdas) {
                continue;
            }
            let celda_codigo = celda(&celdas, COL_PLANA_CODIGO);
            let celda_nombre = celda(&celdas, COL_PLANA_NOMBRE);
            if celda_codigo.to_lowercase().contains("codigo")
                || celda_codigo.to_lowercase().contains("código")
                || celda_nombre.to_lowercase().contains("asignatura")
                || celda_codigo.is_empty()
            {
                continue;
            }

            let codigos = self.extraer_codigos(celda_codigo);
            let mut nombres: Vec<&str> = lineas(celda_nombre);
            let creditos: Vec<&str> = lineas(celda(&celdas, COL_PLANA_CREDITOS));
            if nombres
                .first()
                .is_some_and(|n| n.eq_ignore_ascii_case("obligatorios") || n.eq_ignore_ascii_case("obligatorio"))
            {
                nombres.remove(0);
            }

            for (i, nombre) in nombres.into_iter().enumerate() {
                let Some(codigo) = codigos.get(i) else {
                    break;
                };
                // "3 cursos de ..." describe el grupo, no es un curso
                if nombre.starts_with(|c: char| c.is_ascii_digit()) {
                    continue;
                }
                cursos.push(CursoMalla {
                    codigo: codigo.clone(),
                    nombre: nombre.to_string(),
                    creditos: creditos.get(i).map(|c| normalizar_creditos(c)).unwrap_or_default(),
                    tipo: TipoCursoMalla::ObligatorioConcentracion,
                });
            }
        }
        cursos
    }

    /// Electivos: una fila por curso; sólo cuentan filas con código válido.
    pub fn reconstruir_electivos(&mut self, tabla: &[Vec<Celda>]) -> Vec<CursoMalla> {
        let mut cursos = Vec::new();
        for fila in tabla {
            self.estadisticas.filas_totales += 1;
            let celdas = normalizar_fila(fila);
            let codigo = celda(&celdas, COL_PLANA_CODIGO);
            if !self.es_codigo(codigo) {
                continue;
            }
            cursos.push(CursoMalla {
                codigo: codigo.to_string(),
                nombre: celda(&celdas, COL_PLANA_NOMBRE).to_string(),
                creditos: normalizar_creditos(celda(&celdas, COL_PLANA_CREDITOS)),
                tipo: TipoCursoMalla::Electivo,
            });
        }
        cursos
    }
}

fn lineas(texto: &str) -> Vec<&str> {
    texto.lines().map(str::trim).filter(|l| !l.is_empty()).collect()
}

/// Número de ciclo desde "0", romanos hasta X o arábigos.
pub fn parsear_ciclo(texto: &str) -> Option<u32> {
    let v = texto.trim().to_uppercase();
    if v.is_empty() {
        return None;
    }
    NUMEROS_ROMANOS
        .iter()
        .find(|(romano, _)| *romano == v)
        .map(|(_, n)| *n)
        .or_else(|| v.parse::<u32>().ok().filter(|n| *n <= CICLO_MAXIMO))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fila(celdas: &[&str]) -> Vec<Celda> {
        celdas.iter().map(|c| if c.is_empty() { None } else { Some(c.to_string()) }).collect()
    }

    #[test]
    fn marcas_de_ciclo() {
        assert_eq!(parsear_ciclo("0"), Some(0));
        assert_eq!(parsear_ciclo("iv"), Some(4));
        assert_eq!(parsear_ciclo("X"), Some(10));
        assert_eq!(parsear_ciclo("3"), Some(3));
        assert_eq!(parsear_ciclo(""), None);
        assert_eq!(parsear_ciclo("Ciclo"), None);
        assert_eq!(parsear_ciclo("XI"), None);
    }

    #[test]
    fn cabecera_con_nombre_consume_el_primer_codigo() {
        let tabla = vec![
            fila(&["Ciclo", "Código", "Asignatura", "DA", "T", "P", "C"]),
            fila(&["I", "100001\n100002", "Matemáticas I", "", "", "", "4"]),
            fila(&["", "", "Economía General", "", "", "", "3"]),
            fila(&["", "", "TOTAL", "", "", "", "7"]),
        ];
        let mut r = ReconstructorMalla::new();
        let grupos = r.reconstruir_ciclos(&tabla);
        assert_eq!(grupos.len(), 1);
        assert_eq!(grupos[0].ciclo, ClaveCiclo::Numero(1));
        let codigos: Vec<&str> = grupos[0].cursos.iter().map(|c| c.codigo.as_str()).collect();
        assert_eq!(codigos, vec!["100001", "100002"]);
        assert_eq!(grupos[0].cursos[1].creditos, "3");
        assert_eq!(r.estadisticas().errores, 0);
    }

    #[test]
    fn codigo_explicito_no_avanza_la_cola() {
        let tabla = vec![
            fila(&["0", "100001\n100002", "", "", "", "", ""]),
            fila(&["", "1F0229", "Nivelación", "", "", "", "0"]),
            fila(&["", "", "Lenguaje", "", "", "", "3"]),
            fila(&["", "", "Matemática Básica", "", "", "", "3"]),
        ];
        let grupos = ReconstructorMalla::new().reconstruir_ciclos(&tabla);
        let codigos: Vec<&str> = grupos[0].cursos.iter().map(|c| c.codigo.as_str()).collect();
        assert_eq!(codigos, vec!["1F0229", "100001", "100002"]);
    }

    #[test]
    fn ciclos_vacios_no_se_emiten() {
        let tabla = vec![
            fila(&["I", "", "", "", "", "", ""]),
            fila(&["II", "200001", "Micro I", "", "", "", "4"]),
        ];
        let grupos = ReconstructorMalla::new().reconstruir_ciclos(&tabla);
        assert_eq!(grupos.len(), 1);
        assert_eq!(grupos[0].ciclo, ClaveCiclo::Numero(2));
    }

    #[test]
    fn concentracion_alineada_por_posicion() {
        let tabla = vec![
            fila(&["Código", "Asignatura", "DA", "T", "P", "C"]),
            fila(&["", "Concentración en Finanzas", "", "", "", ""]),
            fila(&[
                "300001\n300002",
                "Obligatorios\nFinanzas I\nFinanzas II\n2 cursos electivos",
                "",
                "",
                "",
                "4\n4",
            ]),
        ];
        let cursos = ReconstructorMalla::new().reconstruir_concentracion(&tabla);
        assert_eq!(cursos.len(), 2);
        assert_eq!(cursos[0].codigo, "300001");
        assert_eq!(cursos[1].nombre, "Finanzas II");
        assert_eq!(cursos[1].creditos, "4");
        assert!(cursos.iter().all(|c| c.tipo == TipoCursoMalla::ObligatorioConcentracion));
    }

    #[test]
    fn electivos_solo_con_codigo() {
        let tabla = vec![
            fila(&["Código", "Asignatura", "DA", "T", "P", "C"]),
            fila(&["400001", "Econometría Aplicada", "", "", "", "3"]),
            fila(&["Total", "", "", "", "", "3"]),
            fila(&["40000", "Código corto", "", "", "", "3"]),
        ];
        let mut r = ReconstructorMalla::new();
        let cursos = r.reconstruir_electivos(&tabla);
        assert_eq!(cursos.len(), 1);
        assert_eq!(cursos[0].tipo, TipoCursoMalla::Electivo);
        assert_eq!(r.estadisticas().filas_totales, 4);
    }
}
