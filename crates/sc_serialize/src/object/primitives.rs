use alloc::string::String;

use crate::impl_typed;

/// Identities of the built-in types and generic families.
pub mod builtin {
    use crate::TypeUuid;
    use uuid::uuid;

    /// `Vec<T>`, combined with the element identity.
    pub const VEC: TypeUuid = TypeUuid::from_uuid(uuid!("19AB5DE9-EEB9-4D27-88BC-844564380896"));
    /// `[T; N]`, combined with the element identity and the length.
    pub const ARRAY: TypeUuid = TypeUuid::from_uuid(uuid!("9BD19C5D-CD5E-4E23-8D6D-7DFF1B4B10D0"));
    /// `Option<T>`, combined with the element identity.
    pub const OPTION: TypeUuid = TypeUuid::from_uuid(uuid!("ED7E3417-3E9B-4B30-A3A6-34C05673EB1A"));
    /// `HashMap<K, V>`, combined with the key and value identities.
    pub const HASH_MAP: TypeUuid = TypeUuid::from_uuid(uuid!("9D259DA3-D938-49B2-8C43-D60A6AAF7E4D"));
    /// `BTreeMap<K, V>`, combined with the key and value identities.
    pub const BTREE_MAP: TypeUuid = TypeUuid::from_uuid(uuid!("5B83FAA2-2EBE-4B27-9472-85291DAD6278"));
    /// `(K, V)`, combined with both identities.
    pub const PAIR: TypeUuid = TypeUuid::from_uuid(uuid!("D6569DCB-18E4-49C1-A947-0F7372757F4C"));
}

impl_typed!(bool, "bool", "BCEF34BA-FC8C-44DF-80E0-C2C05D611A73");
impl_typed!(i8, "i8", "A94966CC-4078-47EB-B6DE-CF6EB78270C5");
impl_typed!(i16, "i16", "D3408A6C-E5BD-4AD9-9989-EBA1E874E357");
impl_typed!(i32, "i32", "CF7C36E5-6F82-4BEE-AB2A-B4FBF39BCF6C");
impl_typed!(i64, "i64", "4C97C804-9817-4C8C-8391-0D029A33E29E");
impl_typed!(u8, "u8", "0A4E0917-3933-478A-8B48-FB71A2ABD5CC");
impl_typed!(u16, "u16", "9BE405FB-F3FC-46F4-80B7-965EBFE0B024");
impl_typed!(u32, "u32", "0A784598-69DB-4059-B448-5BF1B99762B3");
impl_typed!(u64, "u64", "D8E50269-AB48-45AE-8216-F1A11A40E544");
impl_typed!(f32, "f32", "4D3143BF-B9CB-4065-AB85-AA903CEDF6D4");
impl_typed!(f64, "f64", "5D94BFA5-A090-47B6-B703-BD71C59D3040");
impl_typed!(String, "String", "00200FA5-7FB4-4082-9823-0172451A809E");
impl_typed!((), "()", "9A41945C-921A-49F3-B368-7D33E1AD5CD4");
