//! Listing details form.
//!
//! READY listings describe a finished unit; OFF_PLAN listings point at a
//! development project. The two field sets never coexist: switching the
//! category replaces the form with an empty one for the new category.

use serde::{Deserialize, Serialize};

use reelestate_shared::ListingCategory;

use crate::collaborators::{FieldErrors, ListingPayload};
use crate::error::{Result, WizardError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyType {
    Apartment,
    Villa,
    Townhouse,
    Penthouse,
    Studio,
    Office,
}

impl PropertyType {
    pub fn as_str(self) -> &'static str {
        match self {
            PropertyType::Apartment => "apartment",
            PropertyType::Villa => "villa",
            PropertyType::Townhouse => "townhouse",
            PropertyType::Penthouse => "penthouse",
            PropertyType::Studio => "studio",
            PropertyType::Office => "office",
        }
    }
}

/// Emirate → district → building → area. A level cannot be chosen before
/// its parent, and changing a level clears everything below it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSelection {
    emirate: Option<String>,
    district: Option<String>,
    building: Option<String>,
    area: Option<String>,
}

impl LocationSelection {
    pub fn emirate(&self) -> Option<&str> {
        self.emirate.as_deref()
    }

    pub fn district(&self) -> Option<&str> {
        self.district.as_deref()
    }

    pub fn building(&self) -> Option<&str> {
        self.building.as_deref()
    }

    pub fn area(&self) -> Option<&str> {
        self.area.as_deref()
    }

    pub fn set_emirate(&mut self, emirate: impl Into<String>) {
        self.emirate = Some(emirate.into());
        self.district = None;
        self.building = None;
        self.area = None;
    }

    pub fn set_district(&mut self, district: impl Into<String>) -> Result<()> {
        if self.emirate.is_none() {
            return Err(WizardError::ParentNotSelected {
                field: "district",
                parent: "emirate",
            });
        }
        self.district = Some(district.into());
        self.building = None;
        self.area = None;
        Ok(())
    }

    pub fn set_building(&mut self, building: impl Into<String>) -> Result<()> {
        if self.district.is_none() {
            return Err(WizardError::ParentNotSelected {
                field: "building",
                parent: "district",
            });
        }
        self.building = Some(building.into());
        self.area = None;
        Ok(())
    }

    pub fn set_area(&mut self, area: impl Into<String>) -> Result<()> {
        if self.building.is_none() {
            return Err(WizardError::ParentNotSelected {
                field: "area",
                parent: "building",
            });
        }
        self.area = Some(area.into());
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.emirate.is_none()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReadyDetails {
    pub title: String,
    pub price: Option<u64>,
    pub property_type: Option<PropertyType>,
    pub bedrooms: Option<u8>,
    pub bathrooms: Option<u8>,
    pub size_sqft: Option<f64>,
    pub location: LocationSelection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffPlanDetails {
    pub project: Option<ProjectRef>,
}

fn push_error(errors: &mut FieldErrors, field: &str, message: &str) {
    errors
        .entry(field.to_string())
        .or_default()
        .push(message.to_string());
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CategoryDetails {
    Ready(ReadyDetails),
    OffPlan(OffPlanDetails),
}

impl Default for CategoryDetails {
    fn default() -> Self {
        CategoryDetails::Ready(ReadyDetails::default())
    }
}

impl CategoryDetails {
    pub fn category(&self) -> ListingCategory {
        match self {
            CategoryDetails::Ready(_) => ListingCategory::Ready,
            CategoryDetails::OffPlan(_) => ListingCategory::OffPlan,
        }
    }

    /// Switch category, discarding every field of the previous one.
    /// Returns whether anything changed.
    pub fn switch_to(&mut self, category: ListingCategory) -> bool {
        if self.category() == category {
            return false;
        }
        *self = match category {
            ListingCategory::Ready => CategoryDetails::Ready(ReadyDetails::default()),
            ListingCategory::OffPlan => CategoryDetails::OffPlan(OffPlanDetails::default()),
        };
        true
    }

    pub fn ready_mut(&mut self) -> Result<&mut ReadyDetails> {
        match self {
            CategoryDetails::Ready(details) => Ok(details),
            CategoryDetails::OffPlan(_) => Err(WizardError::WrongCategory("ready")),
        }
    }

    pub fn off_plan_mut(&mut self) -> Result<&mut OffPlanDetails> {
        match self {
            CategoryDetails::OffPlan(details) => Ok(details),
            CategoryDetails::Ready(_) => Err(WizardError::WrongCategory("off-plan")),
        }
    }

    /// Required-field check for the active category.
    pub fn validate(&self) -> FieldErrors {
        let mut errors = FieldErrors::new();
        match self {
            CategoryDetails::Ready(d) => {
                if d.title.trim().is_empty() {
                    push_error(&mut errors, "title", "Title is required");
                }
                match d.price {
                    None => push_error(&mut errors, "price", "Price is required"),
                    Some(0) => push_error(&mut errors, "price", "Price must be greater than zero"),
                    Some(_) => {}
                }
                if d.property_type.is_none() {
                    push_error(&mut errors, "property_type", "Property type is required");
                }
                if d.bedrooms.is_none() {
                    push_error(&mut errors, "bedrooms", "Number of bedrooms is required");
                }
                if d.bathrooms.is_none() {
                    push_error(&mut errors, "bathrooms", "Number of bathrooms is required");
                }
                match d.size_sqft {
                    Some(size) if size.is_finite() && size > 0.0 => {}
                    _ => push_error(&mut errors, "size", "Size must be a positive number"),
                }
                let loc = &d.location;
                for (field, value) in [
                    ("emirate", loc.emirate()),
                    ("district", loc.district()),
                    ("building", loc.building()),
                    ("area", loc.area()),
                ] {
                    if value.is_none() {
                        push_error(&mut errors, field, "Location is incomplete");
                    }
                }
            }
            CategoryDetails::OffPlan(d) => {
                if d.project.is_none() {
                    push_error(&mut errors, "project", "Select an off-plan project");
                }
            }
        }
        errors
    }

    /// Listing part of the upload payload. `None` when validation fails.
    pub fn to_payload(&self) -> Option<ListingPayload> {
        match self {
            CategoryDetails::Ready(d) => Some(ListingPayload::Ready {
                title: d.title.trim().to_string(),
                price: d.price.filter(|p| *p > 0)?,
                property_type: d.property_type?.as_str().to_string(),
                bedrooms: d.bedrooms?,
                bathrooms: d.bathrooms?,
                size_sqft: d.size_sqft.filter(|s| s.is_finite() && *s > 0.0)?,
                emirate: d.location.emirate()?.to_string(),
                district: d.location.district()?.to_string(),
                building: d.location.building()?.to_string(),
                area: d.location.area()?.to_string(),
            }),
            CategoryDetails::OffPlan(d) => {
                let project = d.project.as_ref()?;
                Some(ListingPayload::OffPlan {
                    project_id: project.id.clone(),
                    project_title: project.title.clone(),
                })
            }
        }
    }
}
