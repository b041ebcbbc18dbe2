use super::UrlVars;
use crate::error::{QueryError, Result};
use crate::expr::Predicate;
use crate::schema::TableRef;
use std::fmt;

/// Query var carrying a bounding box.
pub const BBOX_KEY: &str = "bbox";

/// Reference field locating the records of a table.
pub const LOCATION_FIELD: &str = "location_id";

/// Geographic window `minlon,minlat,maxlon,maxlat` restricting the records
/// of a located table to those whose location lies strictly inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min_lon: f64,
    pub min_lat: f64,
    pub max_lon: f64,
    pub max_lat: f64,
}

impl BoundingBox {
    /// Parses `minlon,minlat,maxlon,maxlat`.
    ///
    /// ```
    /// # use resquery_core::url::BoundingBox;
    /// let bbox = BoundingBox::parse("119.8,12.8,122.2,15.1").unwrap();
    /// assert_eq!(bbox.max_lat, 15.1);
    /// assert!(BoundingBox::parse("1,2,3").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self> {
        let malformed = |reason| QueryError::MalformedUrlQueryValue {
            value: value.to_owned(),
            reason,
        };
        let mut coords = [0.0; 4];
        let mut parts = value.split(',');
        for coord in &mut coords {
            let part = parts.next().ok_or_else(|| malformed("bbox needs four coordinates"))?;
            *coord = part
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|c| c.is_finite())
                .ok_or_else(|| malformed("bbox coordinate is not a number"))?;
        }
        if parts.next().is_some() {
            return Err(malformed("bbox needs four coordinates"));
        }
        let [min_lon, min_lat, max_lon, max_lat] = coords;
        Ok(Self {
            min_lon,
            min_lat,
            max_lon,
            max_lat,
        })
    }

    /// The first well-formed `bbox` var. Malformed ones are skipped.
    pub fn from_vars(vars: &UrlVars) -> Option<Self> {
        vars.get(BBOX_KEY)?
            .iter()
            .find_map(|value| match Self::parse(value) {
                Ok(bbox) => Some(bbox),
                Err(e) => {
                    resq_warn!(error = %e, "resquery.url.skipped");
                    None
                }
            })
    }

    /// Bounds on the coordinates of `location`.
    pub fn bounds(&self, location: &TableRef) -> Predicate {
        let (lon, lat) = (location.column("lon"), location.column("lat"));
        ((Predicate::gt(lon.clone(), self.min_lon) & Predicate::lt(lon, self.max_lon))
            & Predicate::gt(lat.clone(), self.min_lat))
            & Predicate::lt(lat, self.max_lat)
    }

    /// Restriction of `table` to records located inside the box, joining
    /// `location` implicitly.
    pub fn query(&self, table: &TableRef, location: &TableRef) -> Predicate {
        Predicate::eq(table.column(LOCATION_FIELD), location.column("id")) & self.bounds(location)
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.min_lon, self.min_lat, self.max_lon, self.max_lat
        )
    }
}
