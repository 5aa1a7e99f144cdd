// Helper for generating UUIDv7 (timestamp-sortable UUIDs)
//
// Service tokens are listed newest-first, so their ids are generated
// app-side as UUIDv7. Identity and department rows keep PG's
// gen_random_uuid() (v4).

use uuid::Uuid;

/// Generate a new UUIDv7 (timestamp-sortable).
pub fn uuidv7() -> Uuid {
    Uuid::now_v7()
}
