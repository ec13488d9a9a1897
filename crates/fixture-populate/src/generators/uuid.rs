//! UUID value generator.

use crate::error::BoxError;
use crate::generator::Generator;
use crate::random::Random;
use fixture_core::Value;
use uuid::Uuid;

/// Draw a UUID v4 from the seeded random source.
pub fn random_uuid(random: &mut Random) -> Uuid {
    let mut bytes = [0u8; 16];
    random.fill_bytes(&mut bytes);

    // Set version (4) and variant (RFC 4122) bits
    bytes[6] = (bytes[6] & 0x0f) | 0x40;
    bytes[8] = (bytes[8] & 0x3f) | 0x80;

    Uuid::from_bytes(bytes)
}

/// Generate a random UUID v4 value.
pub fn generate_uuid_v4(random: &mut Random) -> Value {
    Value::Uuid(random_uuid(random))
}

#[derive(Debug, Clone, Default)]
pub struct UuidGenerator;

impl Generator for UuidGenerator {
    fn generate(&self, random: &mut Random) -> Result<Value, BoxError> {
        Ok(generate_uuid_v4(random))
    }
}
