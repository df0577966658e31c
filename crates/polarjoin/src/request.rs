//! Calculation payloads and responses shared by remote and local callers.
//!
//! Wire shape (JSON):
//! - request: `{"type": "join", "ea", "na", "eb", "nb"}` or
//!   `{"type": "polar", "distance", "useAzimuth", "angle" | "degrees"/"minutes"/"seconds",
//!   "polarEa"?, "polarNa"?}`. Numbers may arrive as JSON numbers or numeric strings;
//!   blank strings and `null` count as absent. Unknown fields are ignored.
//! - response: `{"result": {...}}` (status 200) or `{"error": "..."}` (status 400).
//!
//! Values are never rounded here. Every caller goes through `calculate`, so an HTTP
//! handler and an offline client return bit-identical numbers for the same input.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::cfg::DMS_SECONDS_DECIMALS;
use crate::survey::{
    azimuth_from_bearing, bearing_from_azimuth, from_dms, join, normalize_degrees, polar, to_dms,
    Dms, Point, SurveyError,
};

/// Form inputs arrive as strings; accept both numbers and numeric text.
fn loose_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Loose {
        Number(f64),
        Text(String),
    }
    match Option::<Loose>::deserialize(d)? {
        None => Ok(None),
        Some(Loose::Number(x)) => Ok(Some(x)),
        Some(Loose::Text(s)) => {
            let t = s.trim();
            if t.is_empty() {
                Ok(None)
            } else {
                t.parse::<f64>()
                    .map(Some)
                    .map_err(|_| D::Error::custom(format!("not a number: {s:?}")))
            }
        }
    }
}

/// Join request: points A=(ea, na) and B=(eb, nb).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
pub struct JoinRequest {
    #[serde(default, deserialize_with = "loose_number")]
    pub ea: Option<f64>,
    #[serde(default, deserialize_with = "loose_number")]
    pub na: Option<f64>,
    #[serde(default, deserialize_with = "loose_number")]
    pub eb: Option<f64>,
    #[serde(default, deserialize_with = "loose_number")]
    pub nb: Option<f64>,
}

/// Polar request: distance plus either a bearing from East (`angle`) or an
/// azimuth in DMS (`use_azimuth`).
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolarRequest {
    #[serde(default, deserialize_with = "loose_number")]
    pub distance: Option<f64>,
    #[serde(default)]
    pub use_azimuth: Option<bool>,
    #[serde(default, deserialize_with = "loose_number")]
    pub angle: Option<f64>,
    #[serde(default, deserialize_with = "loose_number")]
    pub degrees: Option<f64>,
    #[serde(default, deserialize_with = "loose_number")]
    pub minutes: Option<f64>,
    #[serde(default, deserialize_with = "loose_number")]
    pub seconds: Option<f64>,
    #[serde(default, rename = "polarEa", deserialize_with = "loose_number")]
    pub start_easting: Option<f64>,
    #[serde(default, rename = "polarNa", deserialize_with = "loose_number")]
    pub start_northing: Option<f64>,
}

/// A parsed calculation request.
#[derive(Clone, Debug, PartialEq)]
pub enum CalculationRequest {
    Join(JoinRequest),
    Polar(PolarRequest),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    Join,
    Polar,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Join => "join",
            Method::Polar => "polar",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result record returned for both methods.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CalculationResult {
    pub method: Method,
    pub distance: f64,
    pub azimuth: f64,
    pub bearing_from_east: f64,
    pub delta_e: f64,
    pub delta_n: f64,
    /// Azimuth with seconds rounded for display (carry applied).
    pub azimuth_dms: Dms,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_point: Option<Point>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_point: Option<Point>,
}

/// Response envelope.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CalculationResponse {
    Ok { result: CalculationResult },
    Err { error: String },
}

impl CalculationResponse {
    /// HTTP status an endpoint should answer with.
    pub fn status(&self) -> u16 {
        match self {
            CalculationResponse::Ok { .. } => 200,
            CalculationResponse::Err { .. } => 400,
        }
    }

    pub fn is_ok(&self) -> bool {
        matches!(self, CalculationResponse::Ok { .. })
    }
}

impl From<Result<CalculationResult, SurveyError>> for CalculationResponse {
    fn from(r: Result<CalculationResult, SurveyError>) -> Self {
        match r {
            Ok(result) => CalculationResponse::Ok { result },
            Err(e) => CalculationResponse::Err {
                error: e.to_string(),
            },
        }
    }
}

fn required(field: &str, value: Option<f64>) -> Result<f64, SurveyError> {
    value.ok_or_else(|| SurveyError::invalid(field, "required"))
}

impl CalculationRequest {
    /// Parse a JSON payload, dispatching on its `type` field.
    pub fn from_json(payload: &Value) -> Result<Self, SurveyError> {
        let kind = payload.get("type").and_then(Value::as_str).unwrap_or("");
        let bad = |e: serde_json::Error| SurveyError::invalid("payload", e.to_string());
        match kind {
            "join" => Ok(Self::Join(JoinRequest::deserialize(payload).map_err(bad)?)),
            "polar" => Ok(Self::Polar(PolarRequest::deserialize(payload).map_err(bad)?)),
            _ => Err(SurveyError::invalid("type", "Invalid calculation type")),
        }
    }
}

fn azimuth_dms(azimuth: f64) -> Result<Dms, SurveyError> {
    Ok(to_dms(azimuth)?.rounded(DMS_SECONDS_DECIMALS))
}

fn calculate_join(req: &JoinRequest) -> Result<CalculationResult, SurveyError> {
    let a = Point::new(required("ea", req.ea)?, required("na", req.na)?);
    let b = Point::new(required("eb", req.eb)?, required("nb", req.nb)?);
    let r = join(a, b)?;
    Ok(CalculationResult {
        method: Method::Join,
        distance: r.distance,
        azimuth: r.azimuth,
        bearing_from_east: r.bearing_from_east,
        delta_e: r.delta_e,
        delta_n: r.delta_n,
        azimuth_dms: azimuth_dms(r.azimuth)?,
        start_point: Some(a),
        end_point: Some(b),
    })
}

fn calculate_polar(req: &PolarRequest) -> Result<CalculationResult, SurveyError> {
    let distance = required("distance", req.distance)?;
    let (azimuth, bearing_from_east) = if req.use_azimuth.unwrap_or(false) {
        let az = from_dms(
            required("degrees", req.degrees)?,
            req.minutes.unwrap_or(0.0),
            req.seconds.unwrap_or(0.0),
        )?;
        (normalize_degrees(az), bearing_from_azimuth(az))
    } else {
        let angle = required("angle", req.angle)?;
        (azimuth_from_bearing(angle), normalize_degrees(angle))
    };
    let start = match (req.start_easting, req.start_northing) {
        (Some(e), Some(n)) => Some(Point::new(e, n)),
        (None, None) => None,
        (Some(_), None) => return Err(SurveyError::invalid("polarNa", "required with polarEa")),
        (None, Some(_)) => return Err(SurveyError::invalid("polarEa", "required with polarNa")),
    };
    let r = polar(start.unwrap_or_default(), distance, bearing_from_east)?;
    Ok(CalculationResult {
        method: Method::Polar,
        distance,
        azimuth,
        bearing_from_east,
        delta_e: r.delta_e,
        delta_n: r.delta_n,
        azimuth_dms: azimuth_dms(azimuth)?,
        start_point: start,
        end_point: start.map(|_| r.end_point()),
    })
}

/// Run a typed request through the survey core.
pub fn calculate(req: &CalculationRequest) -> Result<CalculationResult, SurveyError> {
    match req {
        CalculationRequest::Join(j) => calculate_join(j),
        CalculationRequest::Polar(p) => calculate_polar(p),
    }
}

/// Handle a parsed JSON payload.
pub fn respond(payload: &Value) -> CalculationResponse {
    CalculationRequest::from_json(payload)
        .and_then(|req| calculate(&req))
        .into()
}

/// Handle a raw JSON body.
pub fn respond_str(body: &str) -> CalculationResponse {
    match serde_json::from_str::<Value>(body) {
        Ok(payload) => respond(&payload),
        Err(e) => CalculationResponse::Err {
            error: SurveyError::invalid("payload", e.to_string()).to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn result(resp: CalculationResponse) -> CalculationResult {
        match resp {
            CalculationResponse::Ok { result } => result,
            CalculationResponse::Err { error } => panic!("unexpected error: {error}"),
        }
    }

    #[test]
    fn join_payload_with_string_numbers() {
        let resp = respond(&json!({
            "type": "join", "ea": "0", "na": 0, "eb": " 10 ", "nb": "0", "nameA": "A"
        }));
        assert_eq!(resp.status(), 200);
        let r = result(resp);
        assert_eq!(r.method, Method::Join);
        assert!((r.distance - 10.0).abs() < 1e-12);
        assert!((r.azimuth - 90.0).abs() < 1e-12);
        assert_eq!(r.azimuth_dms.degrees, 90);
        assert_eq!(r.end_point, Some(Point::new(10.0, 0.0)));
    }

    #[test]
    fn join_missing_field_is_invalid() {
        let resp = respond(&json!({"type": "join", "ea": 1, "na": 2, "eb": ""}));
        assert_eq!(resp.status(), 400);
        match resp {
            CalculationResponse::Err { error } => assert!(error.contains("eb")),
            _ => panic!("expected error"),
        }
    }

    #[test]
    fn unknown_type_is_rejected() {
        let resp = respond(&json!({"type": "traverse"}));
        assert_eq!(
            resp,
            CalculationResponse::Err {
                error: "invalid type: Invalid calculation type".into()
            }
        );
    }

    #[test]
    fn polar_from_angle_with_start_point() {
        let r = result(respond(&json!({
            "type": "polar", "distance": 50, "useAzimuth": false, "angle": "90",
            "polarEa": "100", "polarNa": "100", "degrees": null
        })));
        assert_eq!(r.azimuth, 0.0);
        let end = r.end_point.unwrap();
        assert!((end.easting - 100.0).abs() < 1e-9);
        assert!((end.northing - 150.0).abs() < 1e-9);
    }

    #[test]
    fn polar_from_azimuth_dms_normalizes_bearing() {
        // Azimuth 120° → bearing −30° → 330°.
        let r = result(respond(&json!({
            "type": "polar", "distance": 10, "useAzimuth": true,
            "degrees": 120, "minutes": 0, "seconds": ""
        })));
        assert!((r.bearing_from_east - 330.0).abs() < 1e-9);
        assert!((r.azimuth - 120.0).abs() < 1e-12);
        assert!(r.delta_e > 0.0 && r.delta_n < 0.0);
        assert!(r.start_point.is_none() && r.end_point.is_none());
    }

    #[test]
    fn polar_validation() {
        let neg = respond(&json!({"type": "polar", "distance": -5, "angle": 10}));
        assert_eq!(neg.status(), 400);
        let no_angle = respond(&json!({"type": "polar", "distance": 5}));
        assert_eq!(no_angle.status(), 400);
        let bad_min = respond(&json!({
            "type": "polar", "distance": 5, "useAzimuth": true, "degrees": 1, "minutes": 75
        }));
        assert_eq!(bad_min.status(), 400);
        let half_start = respond(&json!({
            "type": "polar", "distance": 5, "angle": 0, "polarEa": 1
        }));
        assert_eq!(half_start.status(), 400);
        let text = respond(&json!({"type": "polar", "distance": "five", "angle": 0}));
        assert_eq!(text.status(), 400);
    }

    #[test]
    fn typed_and_json_paths_agree() {
        let typed = calculate(&CalculationRequest::Join(JoinRequest {
            ea: Some(1234.567),
            na: Some(-89.01),
            eb: Some(-42.0),
            nb: Some(777.125),
        }))
        .unwrap();
        let via_json = result(respond_str(
            r#"{"type":"join","ea":1234.567,"na":-89.01,"eb":-42.0,"nb":777.125}"#,
        ));
        assert_eq!(typed, via_json);
    }

    #[test]
    fn envelope_serializes_like_the_endpoint() {
        let ok = respond(&json!({"type": "join", "ea": 0, "na": 0, "eb": 0, "nb": 10}));
        let v = serde_json::to_value(&ok).unwrap();
        assert_eq!(v["result"]["method"], "join");
        assert!(v["result"]["bearing_from_east"].is_number());
        assert_eq!(v["result"]["azimuth_dms"]["minutes"], 0);
        let err = serde_json::to_value(respond_str("{not json")).unwrap();
        assert!(err["error"].as_str().unwrap().starts_with("invalid payload"));
    }
}
