use chrono::NaiveDate;
use matriculaup::extraccion::documento::reportar_tasa;
use matriculaup::extraccion::{DocumentoTablas, Pagina, Tabla, extraer_cursos};
use matriculaup::models::{Operador, Prerequisito, TipoSesion};

fn fila(celdas: &[Option<&str>]) -> Vec<Option<String>> {
    celdas.iter().map(|c| c.map(String::from)).collect()
}

const UMBRAL: f64 = 0.01;

fn documento(tablas: Vec<Tabla>) -> DocumentoTablas {
    DocumentoTablas { fuente: None, paginas: vec![Pagina { tablas }] }
}

fn fecha() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 2, 15).unwrap()
}

fn cabecera_curso() -> Vec<Option<String>> {
    fila(&[Some("138201"), Some("Microeconomia I"), Some("4"), None, None, None])
}

fn prerequisito_truncado() -> Vec<Option<String>> {
    fila(&[Some(""), Some("166097 Contabilidad Financiera I Y ("), None, None, None, None])
}

fn prerequisito_continuacion() -> Vec<Option<String>> {
    fila(&[Some(""), Some("138105 Matematica II)"), None, None, None, None])
}

fn seccion_clase() -> Vec<Option<String>> {
    fila(&[
        Some("A"),
        Some("CLASE"),
        Some("CASTROMATTA, Milagros Del Rosario"),
        Some("LUN"),
        Some("07:30 - 09:30"),
        Some("A-301"),
    ])
}

#[test]
fn continuacion_se_une_antes_de_revisar_truncado() {
    let doc = documento(vec![vec![cabecera_curso(), prerequisito_truncado(), prerequisito_continuacion()]]);
    let resultado = extraer_cursos(&doc, "2026-1", fecha(), UMBRAL);
    let cursos = &resultado.documento.cursos;
    assert_eq!(cursos.len(), 1);
    assert_eq!(cursos[0].codigo, "138201");
    assert_eq!(cursos[0].creditos, "4");

    match cursos[0].prerequisitos.as_ref().expect("debe tener prerequisito") {
        Prerequisito::Expresion { op, items } => {
            assert_eq!(*op, Operador::And);
            assert_eq!(items.len(), 2);
            assert_eq!(items[0], Prerequisito::hoja("166097", "Contabilidad Financiera I"));
            assert_eq!(items[1], Prerequisito::hoja("138105", "Matematica II"));
        }
        otro => panic!("se esperaba AND, llegó {:?}", otro),
    }
    assert_eq!(resultado.estadisticas.errores, 0);
}

#[test]
fn solo_fragmento_truncado_queda_sin_parsear() {
    let doc = documento(vec![vec![cabecera_curso(), prerequisito_truncado()]]);
    let resultado = extraer_cursos(&doc, "2026-1", fecha(), UMBRAL);
    let prereq = resultado.documento.cursos[0].prerequisitos.clone().expect("prerequisito");
    assert_eq!(prereq, Prerequisito::sin_parsear("166097 Contabilidad Financiera I Y ("));
    assert_eq!(resultado.estadisticas.errores, 1);
    assert_eq!(resultado.estadisticas.advertencias.len(), 1);
}

#[test]
fn seccion_con_sesion_y_docentes() {
    let doc = documento(vec![vec![cabecera_curso(), seccion_clase()]]);
    let resultado = extraer_cursos(&doc, "2026-1", fecha(), UMBRAL);
    let curso = &resultado.documento.cursos[0];
    assert_eq!(curso.prerequisitos, None);
    let seccion = &curso.secciones[0];
    assert_eq!(seccion.seccion, "A");
    assert_eq!(seccion.docentes, vec!["CASTROMATTA, Milagros Del Rosario"]);
    let sesion = &seccion.sesiones[0];
    assert_eq!(sesion.tipo, TipoSesion::Clase);
    assert_eq!(sesion.dia, "LUN");
    assert_eq!(sesion.hora_inicio.format("%H:%M").to_string(), "07:30");
    assert_eq!(sesion.hora_fin.format("%H:%M").to_string(), "09:30");
    assert_eq!(sesion.aula.as_deref(), Some("A-301"));
}

#[test]
fn tasa_de_error_sobre_el_umbral() {
    let mut tabla: Tabla = Vec::new();
    for (codigo, previo) in [("100001", "200001 Curso Base Y ("), ("100002", "200002 Otro O"), ("100003", "(")] {
        tabla.push(fila(&[Some(codigo), Some("Curso"), Some("3"), None, None, None]));
        tabla.push(fila(&[None, Some(previo), None, None, None, None]));
        tabla.push(seccion_clase());
    }
    while tabla.len() < 200 {
        tabla.push(vec![None; 6]);
    }
    let resultado = extraer_cursos(&documento(vec![tabla]), "2026-1", fecha(), UMBRAL);
    let stats = &resultado.estadisticas;
    assert_eq!(stats.filas_totales, 200);
    assert_eq!(stats.errores, 3);
    assert!((stats.tasa_error() - 0.015).abs() < 1e-12);
    assert!(stats.supera_umbral(0.01));
    assert_eq!(resultado.documento.cursos.len(), 3);

    // el aviso sigue al umbral configurado, no a uno fijo
    assert!(reportar_tasa(stats, 0.01));
    assert!(!reportar_tasa(stats, 0.02));
}

#[test]
fn diseno_extendido_con_continuaciones_entre_paginas() {
    let ancho = |celdas: &[Option<&str>]| {
        let mut f = fila(celdas);
        f.resize(11, None);
        f
    };
    let pagina1 = vec![
        ancho(&[
            Some("Secc."),
            Some("Obs."),
            Some("Docente"),
            Some("Tipo"),
            None,
            Some("Día"),
            Some("Inicio"),
            Some("Fin"),
        ]),
        ancho(&[
            Some("138201 - Microeconomía I"),
            None,
            None,
            Some("4,0"),
            Some("PREREQUISITO: 166097 Contabilidad Financiera I O"),
        ]),
        ancho(&[None, Some("138105 Matematica II")]),
        ancho(&[
            Some("A"),
            Some("Virtual"),
            Some("PEREZ, Ana / GARCIA, Juan De La Cruz"),
            Some("CLASE"),
            None,
            Some("MAR"),
            Some("08:00"),
            Some("10:00"),
            None,
            Some("40"),
            Some("E-201"),
        ]),
    ];
    let pagina2 = vec![
        ancho(&[
            None,
            None,
            None,
            Some("FINAL"),
            None,
            Some("SAB"),
            Some("09:00"),
            Some("11:00"),
            None,
            None,
            Some("E-101"),
        ]),
        ancho(&[Some("B"), None, Some("SOTO, Luis"), Some("CLASE"), None, Some("JUE"), Some("08:00"), Some("10:00")]),
        ancho(&[Some("138201 - Microeconomía I"), None, None, Some("4")]),
        ancho(&[
            Some("C"),
            None,
            Some("RIOS, Eva"),
            Some("PRÁCTICA"),
            None,
            Some("VIE"),
            Some("14:00"),
            Some("15:30"),
        ]),
    ];
    let doc = DocumentoTablas {
        fuente: Some("Oferta_2026-I.pdf".into()),
        paginas: vec![Pagina { tablas: vec![pagina1] }, Pagina { tablas: vec![pagina2] }],
    };
    let resultado = extraer_cursos(&doc, "2026-1", fecha(), UMBRAL);
    let cursos = &resultado.documento.cursos;
    assert_eq!(cursos.len(), 1, "el curso repetido en la página 2 se fusiona");

    let curso = &cursos[0];
    assert_eq!(curso.nombre, "Microeconomía I");
    assert_eq!(curso.creditos, "4.0");
    assert!(matches!(
        curso.prerequisitos,
        Some(Prerequisito::Expresion { op: Operador::Or, ref items }) if items.len() == 2
    ));

    let etiquetas: Vec<&str> = curso.secciones.iter().map(|s| s.seccion.as_str()).collect();
    assert_eq!(etiquetas, vec!["A", "B", "C"]);
    let a = &curso.secciones[0];
    assert_eq!(a.observaciones, "Virtual");
    assert_eq!(a.docentes, vec!["PEREZ, Ana", "GARCIA, Juan De La Cruz"]);
    assert_eq!(a.sesiones.len(), 2);
    assert_eq!(a.sesiones[1].tipo, TipoSesion::Final);
    assert_eq!(resultado.documento.metadata.fuente.as_deref(), Some("Oferta_2026-I.pdf"));
}

#[test]
fn documento_vacio_no_falla() {
    let resultado = extraer_cursos(&DocumentoTablas::default(), "2026-1", fecha(), UMBRAL);
    assert!(resultado.documento.cursos.is_empty());
    assert_eq!(resultado.estadisticas.tasa_error(), 0.0);
}

#[test]
fn continuacion_extendida_en_columna_de_prerequisito() {
    let ancho = |celdas: &[Option<&str>]| {
        let mut f = fila(celdas);
        f.resize(11, None);
        f
    };
    let tabla = vec![
        ancho(&[
            Some("138201 - Microeconomía I"),
            None,
            None,
            Some("4"),
            Some("PREREQUISITO: 166097 Contabilidad Financiera I Y ("),
        ]),
        ancho(&[None, None, None, None, Some("138105 Matematica II)")]),
        ancho(&[
            Some("A"),
            None,
            Some("PEREZ, Ana"),
            Some("CLASE"),
            None,
            Some("LUN"),
            Some("08:00"),
            Some("10:00"),
        ]),
    ];
    let resultado = extraer_cursos(&documento(vec![tabla]), "2026-1", fecha(), UMBRAL);
    let curso = &resultado.documento.cursos[0];
    assert_eq!(
        curso.prerequisitos,
        Some(Prerequisito::Expresion {
            op: Operador::And,
            items: vec![
                Prerequisito::hoja("166097", "Contabilidad Financiera I"),
                Prerequisito::hoja("138105", "Matematica II"),
            ],
        })
    );
    assert_eq!(resultado.estadisticas.errores, 0);
    assert_eq!(curso.secciones[0].sesiones.len(), 1);
}
