/// Patient records
///
/// Stored in the `patients` collection, one document per patient, scoped to
/// the user who created it (`created_by`). Every query below filters on the
/// owner, so a user never sees or changes another user's patients.
///
/// # Patient codes
///
/// Besides the UUID `id`, each patient gets a human-facing code `P-<n>`.
/// Codes are allocated from the highest existing number in the collection,
/// starting at `P-1001`. The collection carries a unique index on
/// `patient_id`; when two creations race for the same number the loser's
/// insert is rejected and it allocates again (see [`Patient::create`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::{fmt, str::FromStr};
use uuid::Uuid;

use crate::store::{
    from_document, to_document, DocumentStore, Filter, FindOptions, SortOrder, StoreError,
    StoreResult,
};

/// Field holding the numeric part of the code, used for ordering
const SEQUENCE_FIELD: &str = "sequence";

/// Allocation attempts before giving up on a contended code
pub const MAX_CODE_ATTEMPTS: usize = 16;

/// Human-facing sequential patient code, `P-<n>`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PatientCode(u64);

impl PatientCode {
    /// Code given to the first patient
    pub const FIRST: PatientCode = PatientCode(1001);

    /// Wraps a raw number
    pub fn new(number: u64) -> Self {
        PatientCode(number)
    }

    /// Numeric part of the code
    pub fn number(&self) -> u64 {
        self.0
    }

    /// The code after this one
    pub fn next(&self) -> Self {
        PatientCode(self.0 + 1)
    }
}

impl fmt::Display for PatientCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

impl FromStr for PatientCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix("P-")
            .and_then(|n| n.parse::<u64>().ok())
            .map(PatientCode)
            .ok_or_else(|| format!("invalid patient code '{}'", s))
    }
}

impl TryFrom<String> for PatientCode {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PatientCode> for String {
    fn from(code: PatientCode) -> Self {
        code.to_string()
    }
}

/// Patient model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    /// Unique record ID
    pub id: Uuid,

    /// Sequential code, e.g. `P-1001`
    pub patient_id: PatientCode,

    pub name: String,
    pub age: u32,
    pub gender: String,
    pub date_of_birth: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub blood_type: Option<String>,

    #[serde(default)]
    pub allergies: Vec<String>,

    #[serde(default)]
    pub conditions: Vec<String>,

    pub medical_history: Option<String>,

    /// Owning user
    pub created_by: Uuid,

    pub created_at: DateTime<Utc>,
}

/// Input for creating a patient
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreatePatient {
    pub name: String,
    pub age: u32,
    pub gender: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub blood_type: Option<String>,
    #[serde(default)]
    pub allergies: Option<Vec<String>>,
    #[serde(default)]
    pub conditions: Option<Vec<String>>,
    #[serde(default)]
    pub medical_history: Option<String>,
}

/// Partial update: only `Some` fields are written
///
/// An explicit JSON `null` counts as "not provided".
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePatient {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_of_birth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blood_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<String>,
}

impl UpdatePatient {
    /// True when no field is set
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.gender.is_none()
            && self.date_of_birth.is_none()
            && self.phone.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.blood_type.is_none()
            && self.allergies.is_none()
            && self.conditions.is_none()
            && self.medical_history.is_none()
    }
}

fn owner_filter(owner: Uuid) -> Filter {
    Filter::new().eq("created_by", owner.to_string())
}

fn code_filter(owner: Uuid, code: &str) -> Filter {
    owner_filter(owner).eq("patient_id", code)
}

impl Patient {
    /// Collection name
    pub const COLLECTION: &'static str = "patients";

    /// Reads the highest existing code and returns the one after it
    ///
    /// Returns [`PatientCode::FIRST`] on an empty collection. The result is
    /// only a candidate: another writer may claim it before the insert.
    pub async fn next_code(store: &dyn DocumentStore) -> StoreResult<PatientCode> {
        let last = store
            .find_one(
                Self::COLLECTION,
                &Filter::new(),
                FindOptions::sort_by(SEQUENCE_FIELD, SortOrder::Descending),
            )
            .await?;

        let highest = last.and_then(|doc| {
            doc.get(SEQUENCE_FIELD)
                .and_then(Value::as_u64)
                .map(PatientCode::new)
                .or_else(|| {
                    doc.get("patient_id")
                        .and_then(Value::as_str)
                        .and_then(|s| s.parse().ok())
                })
        });

        Ok(highest.map_or(PatientCode::FIRST, |code| code.next()))
    }

    /// Creates a patient owned by `owner` with a freshly allocated code
    ///
    /// Retries allocation when the unique index on `patient_id` rejects the
    /// insert, up to [`MAX_CODE_ATTEMPTS`] times.
    pub async fn create(
        store: &dyn DocumentStore,
        owner: Uuid,
        data: CreatePatient,
    ) -> StoreResult<Self> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();

        for attempt in 1..=MAX_CODE_ATTEMPTS {
            let code = Self::next_code(store).await?;

            let patient = Patient {
                id,
                patient_id: code,
                name: data.name.clone(),
                age: data.age,
                gender: data.gender.clone(),
                date_of_birth: data.date_of_birth.clone(),
                phone: data.phone.clone(),
                email: data.email.clone(),
                address: data.address.clone(),
                blood_type: data.blood_type.clone(),
                allergies: data.allergies.clone().unwrap_or_default(),
                conditions: data.conditions.clone().unwrap_or_default(),
                medical_history: data.medical_history.clone(),
                created_by: owner,
                created_at,
            };

            let mut doc = to_document(&patient)?;
            doc.insert(SEQUENCE_FIELD.to_string(), Value::from(code.number()));

            match store.insert(Self::COLLECTION, doc).await {
                Ok(_) => {
                    tracing::debug!(patient_id = %code, %owner, "created patient");
                    return Ok(patient);
                }
                Err(err) if err.is_duplicate_of("patient_id") => {
                    tracing::warn!(attempt, patient_id = %code, "patient code taken, reallocating");
                }
                Err(err) => return Err(err),
            }
        }

        Err(StoreError::Duplicate {
            collection: Self::COLLECTION.to_string(),
            field: "patient_id".to_string(),
        })
    }

    /// Lists the owner's patients in code order
    pub async fn list_for_owner(store: &dyn DocumentStore, owner: Uuid) -> StoreResult<Vec<Self>> {
        store
            .find(
                Self::COLLECTION,
                &owner_filter(owner),
                FindOptions::sort_by(SEQUENCE_FIELD, SortOrder::Ascending),
            )
            .await?
            .into_iter()
            .map(from_document::<Self>)
            .collect()
    }

    /// Finds one of the owner's patients by code
    pub async fn find_for_owner(
        store: &dyn DocumentStore,
        owner: Uuid,
        code: &str,
    ) -> StoreResult<Option<Self>> {
        store
            .find_one(Self::COLLECTION, &code_filter(owner, code), FindOptions::default())
            .await?
            .map(from_document::<Self>)
            .transpose()
    }

    /// Applies a partial update to one of the owner's patients
    ///
    /// Returns `None` when no patient with that code belongs to `owner`.
    /// Callers reject empty updates before getting here.
    pub async fn update_for_owner(
        store: &dyn DocumentStore,
        owner: Uuid,
        code: &str,
        changes: UpdatePatient,
    ) -> StoreResult<Option<Self>> {
        let filter = code_filter(owner, code);
        let outcome = store
            .update(Self::COLLECTION, &filter, to_document(&changes)?)
            .await?;

        if outcome.matched == 0 {
            return Ok(None);
        }

        Self::find_for_owner(store, owner, code).await
    }

    /// Deletes one of the owner's patients, returning whether it existed
    pub async fn delete_for_owner(
        store: &dyn DocumentStore,
        owner: Uuid,
        code: &str,
    ) -> StoreResult<bool> {
        let deleted = store
            .delete(Self::COLLECTION, &code_filter(owner, code))
            .await?;
        Ok(deleted > 0)
    }
}
