//! Shared fixtures for integration tests: registry documents, VOTables and
//! in-process services.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Mutex};
use std::time::Duration;
use vo_conesearch::catalog::CatalogDatabase;
use vo_conesearch::votable::Field;
use vo_conesearch::{Config, ConeQuery, VoError, VoResult, VoService, VoTable};

/// The `basic` test database.
pub const BASIC_JSON: &str = r#"{
    "__version__": 1,
    "catalogs": {
        "foo": {"title": "bar", "url": "bar.foo"}
    },
    "content": ["A", "B", "C"]
}"#;

/// A small cone search database whose services live under `base`.
///
/// `BROKEN` comes first so default searches have to fall back.
pub fn conesearch_simple_json(base: &str) -> String {
    format!(
        r#"{{
    "__version__": 1,
    "catalogs": {{
        "BROKEN": {{"title": "Broken service", "url": "{base}/broken?"}},
        "USNO-A2": {{"title": "USNO-A2 catalogue", "url": "{base}/usno?CAT=USNO-A2&"}},
        "USNO ACT": {{"title": "USNO ACT catalogue", "url": "{base}/usno?CAT=ACT&"}},
        "USNO NOMAD": {{"title": "USNO NOMAD catalogue", "url": "{base}/usno?CAT=NOMAD&"}},
        "USNO-B1": {{"title": "USNO-B1 catalogue", "url": "{base}/usno?CAT=USNO-B1&"}}
    }},
    "content": ["title", "url"]
}}"#,
        base = base
    )
}

/// A compliant VOTable with `rows` stars near the origin.
pub fn votable(rows: usize) -> String {
    let mut data = String::new();
    for i in 0..rows {
        data.push_str(&format!(
            "<TR><TD>star{}</TD><TD>{:.4}</TD><TD>{:.4}</TD></TR>\n",
            i,
            i as f64 * 0.001,
            -(i as f64) * 0.001
        ));
    }

    format!(
        r#"<?xml version="1.0"?>
<VOTABLE version="1.1" xmlns="http://www.ivoa.net/xml/VOTable/v1.1">
  <RESOURCE>
    <TABLE>
      <FIELD name="id" datatype="char" arraysize="*" ucd="ID_MAIN"/>
      <FIELD name="ra" datatype="double" unit="deg" ucd="POS_EQ_RA_MAIN"/>
      <FIELD name="dec" datatype="double" unit="deg" ucd="POS_EQ_DEC_MAIN"/>
      <DATA>
        <TABLEDATA>
{}        </TABLEDATA>
      </DATA>
    </TABLE>
  </RESOURCE>
</VOTABLE>"#,
        data
    )
}

/// A VOTable that parses fine but lacks the required main UCDs.
pub fn noncompliant_votable() -> String {
    r#"<?xml version="1.0"?>
<VOTABLE version="1.1">
  <RESOURCE>
    <TABLE>
      <FIELD name="id" datatype="char"/>
      <DATA><TABLEDATA><TR><TD>only</TD></TR></TABLEDATA></DATA>
    </TABLE>
  </RESOURCE>
</VOTABLE>"#
        .to_string()
}

/// A VOTable reporting a service-side error.
pub fn error_votable(message: &str) -> String {
    format!(
        r#"<?xml version="1.0"?>
<VOTABLE version="1.1">
  <RESOURCE>
    <INFO ID="Error" name="Error" value="{}"/>
  </RESOURCE>
</VOTABLE>"#,
        message
    )
}

/// Configuration pointing the registry at a mock server.
pub fn mock_config(base_url: &str, dbname: &str) -> Config {
    Config::default()
        .with_vos_baseurl(base_url)
        .with_conesearch_dbname(dbname)
}

pub fn origin(sr: f64) -> ConeQuery {
    ConeQuery::new(0.0, 0.0, sr).unwrap()
}

fn star_table(rows: usize) -> VoTable {
    let fields = ["id", "ra", "dec"]
        .iter()
        .map(|name| Field {
            name: name.to_string(),
            ..Field::default()
        })
        .collect();
    let rows = (0..rows)
        .map(|i| vec![format!("star{}", i), "0.0".to_string(), "0.0".to_string()])
        .collect();
    VoTable::from_rows(fields, rows)
}

/// Sky with a uniform star density: `density` stars per square degree.
///
/// Every search sleeps `latency` plus `row_cost` per returned row, and
/// records the radius it was asked for.
pub struct UniformSky {
    pub density: f64,
    pub latency: Duration,
    pub row_cost: Duration,
    pub radii: Mutex<Vec<f64>>,
}

impl UniformSky {
    pub fn new(density: f64, latency: Duration) -> Self {
        Self {
            density,
            latency,
            row_cost: Duration::ZERO,
            radii: Mutex::new(Vec::new()),
        }
    }

    pub fn with_row_cost(mut self, row_cost: Duration) -> Self {
        self.row_cost = row_cost;
        self
    }

    pub fn radii(&self) -> Vec<f64> {
        self.radii.lock().unwrap().clone()
    }
}

impl VoService for UniformSky {
    fn fetch_database(&self, name: &str) -> VoResult<CatalogDatabase> {
        Err(VoError::Status {
            status: 404,
            message: format!("no database {}", name),
        })
    }

    fn cone_search(&self, _url: &str, query: &ConeQuery, _verb: u8) -> VoResult<VoTable> {
        self.radii.lock().unwrap().push(query.sr);
        let rows = (self.density * query.sr * query.sr).round() as usize;
        std::thread::sleep(self.latency + self.row_cost * rows as u32);
        Ok(star_table(rows))
    }
}

/// A service whose searches block until released.
pub struct GatedService {
    gate: Mutex<mpsc::Receiver<()>>,
    pub searches: AtomicUsize,
}

impl GatedService {
    pub fn with_gate() -> (mpsc::Sender<()>, Self) {
        let (release, gate) = mpsc::channel();
        (
            release,
            Self {
                gate: Mutex::new(gate),
                searches: AtomicUsize::new(0),
            },
        )
    }
}

impl VoService for GatedService {
    fn fetch_database(&self, name: &str) -> VoResult<CatalogDatabase> {
        Err(VoError::Status {
            status: 404,
            message: format!("no database {}", name),
        })
    }

    fn cone_search(&self, _url: &str, _query: &ConeQuery, _verb: u8) -> VoResult<VoTable> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        let _ = self.gate.lock().unwrap().recv();
        Ok(star_table(3))
    }
}
