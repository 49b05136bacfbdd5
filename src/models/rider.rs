use serde::{Deserialize, Serialize};

use crate::models::ids::RiderId;
use crate::store::{Collection, Entity};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rider {
    pub name: String,
    pub phone: String,
}

impl Entity for Rider {
    type Id = RiderId;
    const COLLECTION: Collection = Collection::Rider;
}
