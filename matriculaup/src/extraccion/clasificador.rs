//! Clasificación de filas de la oferta académica.
//!
//! Hay dos disposiciones de columnas conocidas:
//!
//! - `Extendida` (PDF de oferta, 11+ columnas): la cabecera de curso lleva
//!   `"138201 - Microeconomía I"` en la primera celda, créditos en la 4ª y
//!   prerequisito en la 5ª; las filas de sección llevan
//!   `[secc, obs, docentes, tipo, _, día, inicio, fin, _, cupos, aula]`.
//! - `Compacta` (6 columnas): `[código, nombre, créditos, ...]` para el curso,
//!   `["", texto]` para continuar el prerequisito y
//!   `[secc, tipo, docentes, día, "07:30 - 09:30", aula]` para secciones.
//!
//! La disposición se decide una vez por tabla (`DisenoFila::detectar`) y cada
//! fila se clasifica con prioridad fija: curso, sección, continuación de
//! sesión, continuación de prerequisito y, si nada calza, ruido.

use regex::Regex;

use super::celdas::{celda, clave_normalizada, fila_vacia, normalizar_creditos, unir_lineas};

const ANCHO_EXTENDIDO: usize = 11;
const LARGO_MAXIMO_SECCION: usize = 3;

/// Palabras clave de tipo de sesión, ya sin tildes ni signos.
const PALABRAS_CLAVE_SESION: [&str; 17] = [
    "CLASE",
    "CLASES",
    "FINAL",
    "PARCIAL",
    "PRACTICA",
    "PRACTICAS",
    "LABORATORIO",
    "EXAMEN",
    "RECUPERACION",
    "PRACCALIFICADA",
    "PRACDIRIGIDA",
    "PRACTICADIRIGIDA",
    "PRACTICACALIFICADA",
    "TALLER",
    "CANCELADA",
    "EXSUSTITUTORIO",
    "EXREZAGADO",
];

/// Etiquetas de encabezado que se repiten en cada página.
const ETIQUETAS_RUIDO: [&str; 2] = ["Secc", "CURSOS"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisenoFila {
    Extendida,
    Compacta,
}

/// Posiciones de columna según la disposición.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Columnas {
    pub nombre: usize,
    pub creditos: usize,
    pub creditos_combinado: usize,
    pub prerequisito: Option<usize>,
    pub fragmento: usize,
    pub observaciones: Option<usize>,
    pub docentes: usize,
    pub tipo: usize,
    pub dia: usize,
    pub hora_inicio: usize,
    pub hora_fin: Option<usize>,
    pub aula: usize,
}

impl DisenoFila {
    pub fn columnas(self) -> Columnas {
        match self {
            DisenoFila::Extendida => Columnas {
                nombre: 1,
                creditos: 2,
                creditos_combinado: 3,
                prerequisito: Some(4),
                fragmento: 1,
                observaciones: Some(1),
                docentes: 2,
                tipo: 3,
                dia: 5,
                hora_inicio: 6,
                hora_fin: Some(7),
                aula: 10,
            },
            DisenoFila::Compacta => Columnas {
                nombre: 1,
                creditos: 2,
                creditos_combinado: 2,
                prerequisito: None,
                fragmento: 1,
                observaciones: None,
                docentes: 2,
                tipo: 1,
                dia: 3,
                hora_inicio: 4,
                hora_fin: None,
                aula: 5,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CabeceraCurso {
    pub codigo: String,
    pub nombre: String,
    pub creditos: String,
    pub prerequisito_en_linea: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TipoFila {
    CabeceraCurso(CabeceraCurso),
    CabeceraSeccion,
    ContinuacionSesion,
    ContinuacionPrerequisito(String),
    Ruido,
}

pub struct Clasificador {
    codigo_combinado: Regex,
    codigo_solo: Regex,
    etiqueta_prerequisito: Regex,
}

impl Default for Clasificador {
    fn default() -> Self {
        Self::new()
    }
}

impl Clasificador {
    pub fn new() -> Self {
        Clasificador {
            codigo_combinado: Regex::new(r"(?s)^(\d{6})\s*[-–]\s*(.+)").expect("patrón de cabecera válido"),
            codigo_solo: Regex::new(r"^\d{6}$").expect("patrón de código válido"),
            etiqueta_prerequisito: Regex::new(r"(?i)^PRE-?REQUISITOS?\s*:\s*").expect("patrón de etiqueta válido"),
        }
    }

    pub fn es_codigo(&self, texto: &str) -> bool {
        self.codigo_solo.is_match(texto)
    }

    /// Disposición de la tabla: extendida si alguna fila alcanza el ancho
    /// del PDF de oferta o si las palabras clave aparecen en la columna de
    /// tipo extendida más que en la compacta.
    pub fn detectar_diseno(&self, filas: &[Vec<String>]) -> DisenoFila {
        if filas.iter().any(|f| f.len() >= ANCHO_EXTENDIDO) {
            return DisenoFila::Extendida;
        }
        let votos = |diseno: DisenoFila| {
            let col = diseno.columnas().tipo;
            filas.iter().filter(|f| es_palabra_clave(celda(f, col))).count()
        };
        let extendida = votos(DisenoFila::Extendida);
        let compacta = votos(DisenoFila::Compacta);
        let combinadas = filas.iter().filter(|f| self.codigo_combinado.is_match(celda(f, 0))).count();
        if extendida > compacta || (compacta == 0 && combinadas > 0) {
            DisenoFila::Extendida
        } else {
            DisenoFila::Compacta
        }
    }

    pub fn clasificar(&self, celdas: &[String], diseno: DisenoFila) -> TipoFila {
        if fila_vacia(celdas) {
            return TipoFila::Ruido;
        }
        let cols = diseno.columnas();
        let primera = celda(celdas, 0);

        if let Some(cabecera) = self.cabecera_curso(celdas, &cols) {
            return TipoFila::CabeceraCurso(cabecera);
        }

        let tiene_tipo = es_palabra_clave(celda(celdas, cols.tipo));
        if tiene_tipo && self.es_etiqueta_seccion(primera) {
            return TipoFila::CabeceraSeccion;
        }

        if primera.is_empty() {
            if tiene_tipo && !celda(celdas, cols.dia).is_empty() {
                return TipoFila::ContinuacionSesion;
            }
            // en la extendida el resto del prerequisito sigue en su propia columna
            let fragmento = cols
                .prerequisito
                .map(|i| celda(celdas, i))
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| celda(celdas, cols.fragmento));
            if !tiene_tipo && !fragmento.is_empty() {
                return TipoFila::ContinuacionPrerequisito(fragmento.to_string());
            }
        }

        if ETIQUETAS_RUIDO.iter().any(|e| primera.contains(e)) {
            tracing::trace!(primera, "encabezado repetido");
        }
        TipoFila::Ruido
    }

    fn cabecera_curso(&self, celdas: &[String], cols: &Columnas) -> Option<CabeceraCurso> {
        let primera = celda(celdas, 0);

        if let Some(caps) = self.codigo_combinado.captures(primera) {
            let prerequisito = cols
                .prerequisito
                .map(|i| self.quitar_etiqueta_prerequisito(celda(celdas, i)))
                .filter(|p| !p.is_empty());
            return Some(CabeceraCurso {
                codigo: caps[1].to_string(),
                nombre: unir_lineas(&caps[2]),
                creditos: normalizar_creditos(celda(celdas, cols.creditos_combinado)),
                prerequisito_en_linea: prerequisito,
            });
        }

        if self.codigo_solo.is_match(primera) {
            let nombre = unir_lineas(celda(celdas, cols.nombre));
            if nombre.is_empty() {
                return None;
            }
            return Some(CabeceraCurso {
                codigo: primera.to_string(),
                nombre,
                creditos: normalizar_creditos(celda(celdas, cols.creditos)),
                prerequisito_en_linea: None,
            });
        }
        None
    }

    /// Etiqueta corta en mayúsculas que empieza con letra ("A", "AB"). Se
    /// admiten dígitos después de la inicial porque la oferta publica
    /// secciones como "A1"; un código de curso nunca es etiqueta.
    fn es_etiqueta_seccion(&self, texto: &str) -> bool {
        let mut chars = texto.chars();
        let Some(inicial) = chars.next() else {
            return false;
        };
        texto.chars().count() <= LARGO_MAXIMO_SECCION
            && inicial.is_alphabetic()
            && inicial.is_uppercase()
            && chars.all(|c| c.is_ascii_digit() || (c.is_alphabetic() && c.is_uppercase()))
            && !self.es_codigo(texto)
    }

    pub fn quitar_etiqueta_prerequisito(&self, texto: &str) -> String {
        unir_lineas(&self.etiqueta_prerequisito.replace(texto.trim(), ""))
    }
}

/// La celda completa, o su primera palabra, es un tipo de sesión conocido.
pub fn es_palabra_clave(texto: &str) -> bool {
    let compactar = |s: &str| -> String { clave_normalizada(s).chars().filter(|c| c.is_alphanumeric()).collect() };
    let entera = compactar(texto);
    if entera.is_empty() {
        return false;
    }
    if PALABRAS_CLAVE_SESION.contains(&entera.as_str()) {
        return true;
    }
    texto
        .split_whitespace()
        .next()
        .map(|p| PALABRAS_CLAVE_SESION.contains(&compactar(p).as_str()))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fila(celdas: &[&str]) -> Vec<String> {
        celdas.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn palabras_clave() {
        assert!(es_palabra_clave("CLASE"));
        assert!(es_palabra_clave("PRÁC. CALIFICADA"));
        assert!(es_palabra_clave("Práctica"));
        assert!(es_palabra_clave("CLASE VIRTUAL"));
        assert!(!es_palabra_clave("166097 Taller de Investigación"));
        assert!(!es_palabra_clave("Contabilidad Financiera I Y ("));
        assert!(!es_palabra_clave(""));
    }

    #[test]
    fn diseno_por_ancho_y_por_votos() {
        let c = Clasificador::new();
        let compacta = vec![
            fila(&["138201", "Microeconomia I", "4", "", "", ""]),
            fila(&["A", "CLASE", "CASTROMATTA, Milagros", "LUN", "07:30 - 09:30", "A-301"]),
        ];
        assert_eq!(c.detectar_diseno(&compacta), DisenoFila::Compacta);

        let mut extendida = fila(&["138201 - Microeconomia I", "", "", "4", ""]);
        extendida.resize(11, String::new());
        assert_eq!(c.detectar_diseno(&[extendida]), DisenoFila::Extendida);

        let recortada = vec![fila(&["A", "", "PEREZ, Ana", "CLASE", "", "MAR", "08:00", "10:00"])];
        assert_eq!(c.detectar_diseno(&recortada), DisenoFila::Extendida);
    }

    #[test]
    fn cabecera_combinada_con_prerequisito_en_linea() {
        let c = Clasificador::new();
        let celdas = fila(&[
            "138201 – Microeconomía\nI",
            "",
            "",
            "4,5",
            "PREREQUISITO: 138105 Matematica II",
            "",
            "",
            "",
            "",
            "",
            "",
        ]);
        match c.clasificar(&celdas, DisenoFila::Extendida) {
            TipoFila::CabeceraCurso(cab) => {
                assert_eq!(cab.codigo, "138201");
                assert_eq!(cab.nombre, "Microeconomía I");
                assert_eq!(cab.creditos, "4.5");
                assert_eq!(cab.prerequisito_en_linea.as_deref(), Some("138105 Matematica II"));
            }
            otro => panic!("{:?}", otro),
        }
    }

    #[test]
    fn continuacion_en_columna_de_prerequisito() {
        let c = Clasificador::new();
        let d = DisenoFila::Extendida;
        let mut en_columna = fila(&["", "", "", "", "138105 Matematica II)"]);
        en_columna.resize(11, String::new());
        assert_eq!(
            c.clasificar(&en_columna, d),
            TipoFila::ContinuacionPrerequisito("138105 Matematica II)".to_string())
        );
        let mut en_nombre = fila(&["", "138105 Matematica II)"]);
        en_nombre.resize(11, String::new());
        assert_eq!(
            c.clasificar(&en_nombre, d),
            TipoFila::ContinuacionPrerequisito("138105 Matematica II)".to_string())
        );
    }

    #[test]
    fn filas_compactas() {
        let c = Clasificador::new();
        let d = DisenoFila::Compacta;
        assert!(matches!(
            c.clasificar(&fila(&["138201", "Microeconomia I", "4", "", "", ""]), d),
            TipoFila::CabeceraCurso(CabeceraCurso { ref codigo, .. }) if codigo == "138201"
        ));
        assert_eq!(
            c.clasificar(&fila(&["A", "CLASE", "CASTROMATTA, Milagros", "LUN", "07:30 - 09:30", "A-301"]), d),
            TipoFila::CabeceraSeccion
        );
        assert_eq!(
            c.clasificar(&fila(&["", "FINAL", "", "SAB", "09:00 - 11:00", "A-101"]), d),
            TipoFila::ContinuacionSesion
        );
        assert_eq!(
            c.clasificar(&fila(&["", "138105 Matematica II)", "", "", "", ""]), d),
            TipoFila::ContinuacionPrerequisito("138105 Matematica II)".into())
        );
    }

    #[test]
    fn ruido_y_ambiguedad() {
        let c = Clasificador::new();
        let d = DisenoFila::Compacta;
        assert_eq!(c.clasificar(&fila(&["", "", ""]), d), TipoFila::Ruido);
        assert_eq!(c.clasificar(&fila(&["Secc.", "Tipo", "Docente", "Día", "Hora", "Aula"]), d), TipoFila::Ruido);
        assert_eq!(c.clasificar(&fila(&["CURSOS OBLIGATORIOS"]), d), TipoFila::Ruido);
        // sin tipo de sesión no es sección aunque la etiqueta lo parezca
        assert_eq!(c.clasificar(&fila(&["A", "", "", "LUN"]), d), TipoFila::Ruido);
        // código suelto sin nombre
        assert_eq!(c.clasificar(&fila(&["138201"]), d), TipoFila::Ruido);
        // continuación de sesión sin día no es sesión ni prerequisito
        assert_eq!(c.clasificar(&fila(&["", "CLASE", "", ""]), d), TipoFila::Ruido);
    }

    #[test]
    fn etiquetas_de_seccion() {
        let c = Clasificador::new();
        assert!(c.es_etiqueta_seccion("A"));
        assert!(c.es_etiqueta_seccion("A1"));
        assert!(c.es_etiqueta_seccion("AB"));
        assert!(!c.es_etiqueta_seccion("a"));
        assert!(!c.es_etiqueta_seccion("ABCD"));
        assert!(!c.es_etiqueta_seccion("1A"));
        assert!(!c.es_etiqueta_seccion(""));
    }
}
