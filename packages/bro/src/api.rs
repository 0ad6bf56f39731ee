//! BRO CPT API client that ties the HTTP layer, validation and parsing together.

use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::json;

use crate::characteristics::{parse_characteristics_response, CptCharacteristics};
use crate::config::{
    characteristics_url, object_url, validate_bro_id, validate_date_range, BRO_CPT_BASE_URL,
};
use crate::error::{BroError, Result};
use crate::geometry::Area;
use crate::http::{create_client, create_client_with_timeout, get_xml, post_json_for_xml};
use crate::xml::{ImbroFile, ParsedValue};

/// Client for the public BRO CPT service.
///
/// # Example
///
/// ```no_run
/// use bro::api::BroClient;
/// use bro::geometry::{Area, Envelope, Point};
///
/// let client = BroClient::new()?;
/// let area = Area::from(Envelope::new(
///     Point::new(51.92269686635185, 4.469594207611851),
///     Point::new(51.923034432171065, 4.470094707426648),
/// ));
/// let available = client.search_characteristics("2015-01-01", "2023-03-03", &area)?;
/// for cpt in &available {
///     let xml = client.get_cpt_object(&cpt.bro_id)?;
///     println!("{}: {} bytes", cpt.bro_id, xml.len());
/// }
/// # Ok::<(), bro::BroError>(())
/// ```
#[derive(Debug, Clone)]
pub struct BroClient {
    client: Client,
    base_url: String,
}

impl BroClient {
    /// Client against the public BRO endpoint with the default timeout.
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(create_client()?, BRO_CPT_BASE_URL))
    }

    /// Client against another base URL (a mirror or a test server).
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        Ok(Self::with_client(create_client()?, base_url))
    }

    /// Client with a custom base URL and timeout.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        Ok(Self::with_client(
            create_client_with_timeout(timeout)?,
            base_url,
        ))
    }

    /// Wrap an existing reqwest client.
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Search the CPT objects registered in a date range within an area.
    ///
    /// Returns metadata only, without measurements. BRO refuses searches
    /// yielding more than 1000 objects or 500 MB.
    ///
    /// # Arguments
    /// * `begin_date` - Start of the registration period, YYYY-MM-DD, not before 2015-01-01
    /// * `end_date` - End of the registration period, YYYY-MM-DD
    /// * `area` - Circle or envelope to search in
    pub fn search_characteristics(
        &self,
        begin_date: &str,
        end_date: &str,
        area: &Area,
    ) -> Result<Vec<CptCharacteristics>> {
        validate_date_range(begin_date, end_date)?;
        area.validate()?;

        let body = json!({
            "registrationPeriod": {
                "beginDate": begin_date,
                "endDate": end_date,
            },
            "area": area.bro_json(),
        });

        tracing::debug!(begin_date, end_date, "Searching CPT characteristics");
        let xml = post_json_for_xml(&self.client, &characteristics_url(&self.base_url), &body)?;
        parse_characteristics_response(&xml)
    }

    /// Download the IMBRO XML of a CPT object.
    pub fn get_cpt_object(&self, bro_id: &str) -> Result<Vec<u8>> {
        validate_bro_id(bro_id)?;

        tracing::debug!(bro_id, "Downloading CPT object");
        get_xml(&self.client, &object_url(&self.base_url, bro_id)).map_err(|e| {
            BroError::ObjectDownload {
                bro_id: bro_id.to_string(),
                source: Box::new(e),
            }
        })
    }

    /// Download a CPT object and parse it into a [`ParsedValue`].
    pub fn get_cpt_object_parsed(&self, bro_id: &str) -> Result<ParsedValue> {
        let xml = self.get_cpt_object(bro_id)?;
        ImbroFile::new(xml).parse()
    }

    /// Search an area and download every CPT object found, one by one.
    pub fn get_cpt_objects_in_area(
        &self,
        begin_date: &str,
        end_date: &str,
        area: &Area,
    ) -> Result<Vec<Vec<u8>>> {
        let available = self.search_characteristics(begin_date, end_date, area)?;
        tracing::info!(count = available.len(), "Retrieving CPT objects");

        available
            .iter()
            .map(|cpt| self.get_cpt_object(&cpt.bro_id))
            .collect()
    }

    /// Like [`get_cpt_objects_in_area`](Self::get_cpt_objects_in_area), parsing each object.
    pub fn get_cpt_objects_in_area_parsed(
        &self,
        begin_date: &str,
        end_date: &str,
        area: &Area,
    ) -> Result<Vec<ParsedValue>> {
        self.get_cpt_objects_in_area(begin_date, end_date, area)?
            .into_iter()
            .map(|xml| ImbroFile::new(xml).parse())
            .collect()
    }
}

/// Search CPT characteristics using a default client.
pub fn get_cpt_characteristics(
    begin_date: &str,
    end_date: &str,
    area: &Area,
) -> Result<Vec<CptCharacteristics>> {
    BroClient::new()?.search_characteristics(begin_date, end_date, area)
}

/// Download a CPT object using a default client.
pub fn get_cpt_object(bro_id: &str) -> Result<Vec<u8>> {
    BroClient::new()?.get_cpt_object(bro_id)
}

/// Search an area and download all CPT objects using a default client.
pub fn get_cpt_characteristics_and_return_cpt_objects(
    begin_date: &str,
    end_date: &str,
    area: &Area,
) -> Result<Vec<Vec<u8>>> {
    BroClient::new()?.get_cpt_objects_in_area(begin_date, end_date, area)
}
