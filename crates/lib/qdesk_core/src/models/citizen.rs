//! Citizen (beneficiary) identity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Role;
use crate::validation::{self, ValidationError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    pub phone: String,
    pub alternate_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub province: String,
    pub postal_code: Option<String>,
}

/// A registered citizen.
///
/// `password_hash` is optional (citizens log in with id + national ID) and is
/// never serialized.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Citizen {
    pub id: Uuid,
    pub name: String,
    pub national_id: String,
    pub contact_details: ContactDetails,
    pub address: Address,
    pub purpose: String,
    pub role: Role,
    #[serde(skip_serializing)]
    pub password_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Citizen {
    pub fn summary(&self) -> CitizenSummary {
        CitizenSummary {
            id: self.id,
            name: self.name.clone(),
            national_id: self.national_id.clone(),
        }
    }
}

/// Public-safe projection: what token views and lookups expose.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenSummary {
    pub id: Uuid,
    pub name: String,
    pub national_id: String,
}

/// A validated registration, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewCitizen {
    pub name: String,
    pub national_id: String,
    pub contact_details: ContactDetails,
    pub address: Address,
    pub purpose: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetailsInput {
    pub phone: Option<String>,
    pub alternate_phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub street: Option<String>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub postal_code: Option<String>,
}

/// Raw registration payload. Every field is optional here so that a missing
/// field is reported as a validation error rather than a decode failure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterCitizen {
    pub name: Option<String>,
    #[serde(alias = "cnic")]
    pub national_id: Option<String>,
    pub contact_details: Option<ContactDetailsInput>,
    pub address: Option<AddressInput>,
    pub purpose: Option<String>,
}

impl RegisterCitizen {
    pub fn validate(self) -> Result<NewCitizen, ValidationError> {
        let name = validation::required("name", self.name)?;
        let national_id = validation::national_id(validation::required(
            "nationalId",
            self.national_id,
        )?)?;

        let contact = self.contact_details.unwrap_or_default();
        let phone = validation::phone(validation::required("contactDetails.phone", contact.phone)?)?;
        let alternate_phone = validation::optional(contact.alternate_phone)
            .map(validation::phone)
            .transpose()?;

        let address = self.address.unwrap_or_default();
        let street = validation::required("address.street", address.street)?;
        let city = validation::required("address.city", address.city)?;
        let province = validation::required("address.province", address.province)?;
        let postal_code = validation::optional(address.postal_code)
            .map(validation::postal_code)
            .transpose()?;

        let purpose = validation::required("purpose", self.purpose)?;

        Ok(NewCitizen {
            name,
            national_id,
            contact_details: ContactDetails {
                phone,
                alternate_phone,
            },
            address: Address {
                street,
                city,
                province,
                postal_code,
            },
            purpose,
        })
    }
}

/// Partial update of a citizen record.
///
/// `role` and `password` are privileged: callers strip them for non-admin
/// actors via [`CitizenPatch::strip_privileged`]. The password is hashed by
/// the caller; [`CitizenPatch::apply_to`] never touches `password_hash`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CitizenPatch {
    pub name: Option<String>,
    pub contact_details: Option<ContactDetailsInput>,
    pub address: Option<AddressInput>,
    pub purpose: Option<String>,
    pub role: Option<Role>,
    pub password: Option<String>,
}

impl CitizenPatch {
    pub fn strip_privileged(&mut self) {
        self.role = None;
        self.password = None;
    }

    /// Validate and copy every present field onto `citizen`.
    pub fn apply_to(&self, citizen: &mut Citizen) -> Result<(), ValidationError> {
        if let Some(name) = &self.name {
            citizen.name = validation::required("name", Some(name.clone()))?;
        }
        if let Some(contact) = &self.contact_details {
            if let Some(phone) = &contact.phone {
                citizen.contact_details.phone = validation::phone(phone.trim().to_string())?;
            }
            if let Some(alt) = &contact.alternate_phone {
                citizen.contact_details.alternate_phone = validation::optional(Some(alt.clone()))
                    .map(validation::phone)
                    .transpose()?;
            }
        }
        if let Some(address) = &self.address {
            if let Some(street) = &address.street {
                citizen.address.street = validation::required("address.street", Some(street.clone()))?;
            }
            if let Some(city) = &address.city {
                citizen.address.city = validation::required("address.city", Some(city.clone()))?;
            }
            if let Some(province) = &address.province {
                citizen.address.province =
                    validation::required("address.province", Some(province.clone()))?;
            }
            if let Some(postal) = &address.postal_code {
                citizen.address.postal_code = validation::optional(Some(postal.clone()))
                    .map(validation::postal_code)
                    .transpose()?;
            }
        }
        if let Some(purpose) = &self.purpose {
            citizen.purpose = validation::required("purpose", Some(purpose.clone()))?;
        }
        if let Some(role) = self.role {
            citizen.role = role;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ali() -> RegisterCitizen {
        serde_json::from_value(serde_json::json!({
            "name": "  Ali ",
            "nationalId": "12345-1234567-1",
            "contactDetails": { "phone": "0300-1234567" },
            "address": { "street": "1 Mall Road", "city": "Lahore", "province": "Punjab" },
            "purpose": "ID card"
        }))
        .unwrap()
    }

    fn stored(new: NewCitizen) -> Citizen {
        let now = Utc::now();
        Citizen {
            id: Uuid::new_v4(),
            name: new.name,
            national_id: new.national_id,
            contact_details: new.contact_details,
            address: new.address,
            purpose: new.purpose,
            role: Role::User,
            password_hash: Some("$2b$10$secret".into()),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn valid_registration_is_trimmed() {
        let new = ali().validate().unwrap();
        assert_eq!(new.name, "Ali");
        assert_eq!(new.contact_details.phone, "0300-1234567");
        assert_eq!(new.address.postal_code, None);
    }

    #[test]
    fn cnic_alias_is_accepted() {
        let input: RegisterCitizen =
            serde_json::from_value(serde_json::json!({ "cnic": "12345-1234567-1" })).unwrap();
        assert_eq!(input.national_id.as_deref(), Some("12345-1234567-1"));
    }

    #[test]
    fn missing_phone_is_reported_by_field() {
        let mut input = ali();
        input.contact_details = None;
        let err = input.validate().unwrap_err();
        assert!(err.to_string().contains("contactDetails.phone"), "{err}");
    }

    #[test]
    fn malformed_national_id_is_rejected() {
        let mut input = ali();
        input.national_id = Some("1234512345671".into());
        assert!(input.validate().is_err());
    }

    #[test]
    fn malformed_postal_code_is_rejected() {
        let mut input = ali();
        input.address.as_mut().unwrap().postal_code = Some("54O00".into());
        assert!(input.validate().is_err());
    }

    #[test]
    fn password_hash_is_never_serialized() {
        let citizen = stored(ali().validate().unwrap());
        let json = serde_json::to_value(&citizen).unwrap();
        assert!(json.get("passwordHash").is_none());
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["nationalId"], "12345-1234567-1");
    }

    #[test]
    fn stripped_patch_keeps_role() {
        let mut citizen = stored(ali().validate().unwrap());
        let mut patch = CitizenPatch {
            name: Some("Ali Khan".into()),
            role: Some(Role::Admin),
            password: Some("hunter22".into()),
            ..Default::default()
        };
        patch.strip_privileged();
        patch.apply_to(&mut citizen).unwrap();
        assert_eq!(citizen.name, "Ali Khan");
        assert_eq!(citizen.role, Role::User);
        assert!(patch.password.is_none());
    }

    #[test]
    fn patch_validates_phone() {
        let mut citizen = stored(ali().validate().unwrap());
        let patch = CitizenPatch {
            contact_details: Some(ContactDetailsInput {
                phone: Some("12".into()),
                alternate_phone: None,
            }),
            ..Default::default()
        };
        assert!(patch.apply_to(&mut citizen).is_err());
        assert_eq!(citizen.contact_details.phone, "0300-1234567");
    }
}
