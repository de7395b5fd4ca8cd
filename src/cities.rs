//! Sample city resource with full CRUD, used by the binary and the
//! integration tests.
//!
//! The store is an explicit object captured by the handlers at registration
//! time — handlers themselves stay stateless.

use crate::router::{ParamSpec, Router};
use anyhow::{anyhow, Context};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::{SystemTime, UNIX_EPOCH};

/// Sample model: a city keyed by its airport-style code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    pub code: String,
    pub name: String,
    /// Unix seconds, stamped on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<u64>,
    /// Unix seconds, stamped on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<u64>,
}

impl City {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            created_at: Some(unix_now()),
            updated_at: None,
        }
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// In-memory city datastore, shared between handlers.
#[derive(Debug, Clone, Default)]
pub struct CityStore {
    cities: Arc<RwLock<HashMap<String, City>>>,
}

impl CityStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-seeded with the four sample cities.
    #[must_use]
    pub fn with_samples() -> Self {
        let store = Self::new();
        {
            let mut cities = store.cities.write().expect("fresh lock");
            for (code, name) in [
                ("NYC", "New York"),
                ("LAX", "Los Angeles"),
                ("SFO", "San Francisco"),
                ("BOS", "Boston"),
            ] {
                cities.insert(code.to_string(), City::new(code, name));
            }
        }
        store
    }

    fn read(&self) -> anyhow::Result<std::sync::RwLockReadGuard<'_, HashMap<String, City>>> {
        self.cities.read().map_err(|_| anyhow!("city store lock poisoned"))
    }

    fn write(&self) -> anyhow::Result<std::sync::RwLockWriteGuard<'_, HashMap<String, City>>> {
        self.cities.write().map_err(|_| anyhow!("city store lock poisoned"))
    }
}

/// The imperative registration pass: declare every city operation against
/// the router.
pub fn register_routes(router: &mut Router, store: &CityStore) {
    let s = store.clone();
    router.register(
        "GET",
        "/cities",
        "",
        Arc::new(move |_params| {
            let cities = s.read()?;
            serde_json::to_value(&*cities).context("serializing city map")
        }),
    );

    let s = store.clone();
    router.register(
        "GET",
        "/cities",
        ":city",
        Arc::new(move |params| {
            let code = params
                .get("city")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow!("missing city parameter"))?;
            let cities = s.read()?;
            match cities.get(code) {
                Some(city) => serde_json::to_value(city).context("serializing city"),
                None => Ok(Value::Null),
            }
        }),
    );

    let s = store.clone();
    router.register_with_inputs(
        "POST",
        "/cities",
        "new",
        vec![ParamSpec::body("city")],
        Arc::new(move |params| {
            let payload = params.get("city").cloned().unwrap_or(Value::Null);
            let mut city: City =
                serde_json::from_value(payload).context("decoding city payload")?;
            city.created_at = Some(unix_now());
            let mut cities = s.write()?;
            cities.insert(city.code.clone(), city.clone());
            serde_json::to_value(&city).context("serializing city")
        }),
    );

    let s = store.clone();
    router.register_with_inputs(
        "PUT",
        "/cities",
        ":city",
        vec![ParamSpec::body("city_data")],
        Arc::new(move |params| {
            let code = params
                .get("city")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow!("missing city parameter"))?;
            let upd: City = serde_json::from_value(
                params.get("city_data").cloned().unwrap_or(Value::Null),
            )
            .context("decoding city payload")?;
            let mut cities = s.write()?;
            match cities.get_mut(code) {
                Some(city) => {
                    city.name = upd.name;
                    city.updated_at = Some(unix_now());
                    serde_json::to_value(&*city).context("serializing city")
                }
                None => Ok(Value::Null),
            }
        }),
    );

    let s = store.clone();
    router.register(
        "DELETE",
        "/cities",
        ":city",
        Arc::new(move |params| {
            let code = params
                .get("city")
                .and_then(Value::as_str)
                .ok_or_else(|| anyhow!("missing city parameter"))?;
            let mut cities = s.write()?;
            cities.remove(code);
            Ok(Value::String(format!("City [{code}] deleted successfully")))
        }),
    );

    // Rooted suffix: registers at /echo/:str, not under /cities.
    router.register(
        "GET",
        "/cities",
        "/echo/:str",
        Arc::new(move |params| {
            let text = params.get("str").and_then(Value::as_str).unwrap_or("");
            Ok(Value::String(format!("echo: {text}")))
        }),
    );
}
