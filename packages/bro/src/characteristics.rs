//! CPT characteristics returned by a BRO characteristics search.
//!
//! A characteristics search answers with a `dispatchCharacteristicsResponse`
//! holding one `dispatchDocument` per registered object. Documents carrying
//! a `CPT_C` element describe an available CPT (metadata only, no
//! measurements). Other documents, typically `BRO_DO` for deregistered
//! objects, are skipped.

use roxmltree::Node;
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::{BroError, Result};
use crate::geometry::{Point, RdPoint};
use crate::xml::{find_by_path, find_child, find_children, get_text, parse_document};

/// Metadata of a single CPT object, as found in a characteristics search.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CptCharacteristics {
    pub gml_id: String,
    pub bro_id: String,
    pub deregistered: bool,
    pub accountable_party: String,
    pub quality_regime: String,
    pub object_registration_time: String,
    pub under_review: bool,
    /// Location in WGS84.
    pub standardized_location: Point,
    /// Location in RD New, as delivered.
    pub delivered_location: RdPoint,
    pub local_vertical_reference_point: String,
    pub vertical_datum: String,
    pub cpt_standard: String,
    pub offset: f64,
    pub quality_class: String,
    pub research_report_date: String,
    pub start_time: String,
    pub predrilled_depth: Option<f64>,
    pub final_depth: f64,
    pub survey_purpose: String,
    pub dissipation_test_performed: bool,
    pub stop_criterion: String,
}

impl CptCharacteristics {
    /// Build from a `CPT_C` element.
    pub fn from_node(node: Node<'_, '_>) -> Result<Self> {
        let gml_id = node
            .attributes()
            .find(|attr| attr.name() == "id")
            .map(|attr| attr.value().to_string())
            .ok_or_else(|| missing("@gml:id", node))?;

        let standardized = parse_pos(&required(node, "standardizedLocation/pos")?, "standardizedLocation")?;
        let delivered = parse_pos(&required(node, "deliveredLocation/pos")?, "deliveredLocation")?;

        Ok(Self {
            gml_id,
            bro_id: required(node, "broId")?,
            deregistered: str2bool(&required(node, "deregistered")?),
            accountable_party: required(node, "deliveryAccountableParty")?,
            quality_regime: required(node, "qualityRegime")?,
            object_registration_time: required(node, "objectRegistrationTime")?,
            under_review: str2bool(&required(node, "underReview")?),
            standardized_location: Point::new(standardized.0, standardized.1),
            delivered_location: RdPoint::new(delivered.0, delivered.1),
            local_vertical_reference_point: required(node, "localVerticalReferencePoint")?,
            vertical_datum: required(node, "verticalDatum")?,
            cpt_standard: required(node, "cptStandard")?,
            offset: parse_f64("offset", &required(node, "offset")?)?,
            quality_class: required(node, "qualityClass")?,
            research_report_date: required(node, "researchReportDate/date")?,
            start_time: required(node, "startTime")?,
            predrilled_depth: optional(node, "predrilledDepth")
                .map(|value| parse_f64("predrilledDepth", &value))
                .transpose()?,
            final_depth: parse_f64("finalDepth", &required(node, "finalDepth")?)?,
            survey_purpose: required(node, "surveyPurpose")?,
            dissipation_test_performed: str2bool(&required(node, "dissipationTestPerformed")?),
            stop_criterion: required(node, "stopCriterion")?,
        })
    }

    pub fn rd_coordinate(&self) -> RdPoint {
        self.delivered_location
    }

    pub fn wgs84_coordinate(&self) -> Point {
        self.standardized_location
    }

    /// The CPT location as a GeoJSON point feature.
    pub fn to_geojson_feature(&self) -> Value {
        let location = self.wgs84_coordinate();
        json!({
            "type": "Feature",
            "geometry": {
                "type": "Point",
                "coordinates": [location.lon, location.lat],
            },
            "properties": {
                "bro_id": self.bro_id,
            }
        })
    }
}

/// Parse a `dispatchCharacteristicsResponse` document.
///
/// # Errors
/// `NoDocumentsFound` when the search matched nothing, `MissingElement` or
/// `InvalidValue` for incomplete `CPT_C` entries.
pub fn parse_characteristics_response(xml: &[u8]) -> Result<Vec<CptCharacteristics>> {
    let doc = parse_document(xml)?;
    let root = doc.root_element();

    let count_text = find_child(root, "numberOfDocuments")
        .map(get_text)
        .ok_or_else(|| missing("numberOfDocuments", root))?;
    let count: usize = count_text.parse().map_err(|_| BroError::InvalidValue {
        field: "numberOfDocuments".to_string(),
        value: count_text.clone(),
    })?;
    if count == 0 {
        return Err(BroError::NoDocumentsFound);
    }

    let mut characteristics = Vec::new();
    for document in find_children(root, "dispatchDocument") {
        match find_child(document, "CPT_C") {
            Some(cpt) => characteristics.push(CptCharacteristics::from_node(cpt)?),
            None => {
                let bro_id = find_by_path(document, "BRO_DO/broId").map(get_text);
                tracing::info!(
                    bro_id = bro_id.as_deref().unwrap_or("unknown"),
                    "Skipping dispatch document without CPT characteristics"
                );
            }
        }
    }

    tracing::info!(
        available = characteristics.len(),
        documents = count,
        "Parsed characteristics response"
    );
    Ok(characteristics)
}

/// Lenient boolean coercion used for BRO indicator fields.
///
/// # Examples
/// ```
/// use bro::characteristics::str2bool;
///
/// assert!(str2bool("ja"));
/// assert!(str2bool("True"));
/// assert!(!str2bool("nee"));
/// ```
pub fn str2bool(value: &str) -> bool {
    matches!(
        value.trim().to_lowercase().as_str(),
        "ja" | "yes" | "true" | "t" | "1"
    )
}

fn required(node: Node<'_, '_>, path: &str) -> Result<String> {
    optional(node, path).ok_or_else(|| missing(path, node))
}

fn optional(node: Node<'_, '_>, path: &str) -> Option<String> {
    find_by_path(node, path)
        .map(get_text)
        .filter(|text| !text.is_empty())
}

fn missing(element: &str, node: Node<'_, '_>) -> BroError {
    BroError::MissingElement {
        element: element.to_string(),
        context: node.tag_name().name().to_string(),
    }
}

fn parse_f64(field: &str, value: &str) -> Result<f64> {
    value.parse().map_err(|_| BroError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
    })
}

/// Split a `gml:pos` value ("first second") into two numbers.
fn parse_pos(value: &str, field: &str) -> Result<(f64, f64)> {
    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(first), Some(second), None) => Ok((parse_f64(field, first)?, parse_f64(field, second)?)),
        _ => Err(BroError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
        }),
    }
}
