// src/schema.rs
//
// Fixed shape of a repaired Shopify customer export. Column positions:
//
//  0 First Name
//  1 Last Name
//  2 Email
//  3 Default Address Company
//  4 Default Address Address1
//  5 Default Address Address2
//  6 Default Address City
//  7 Default Address Province Code
//  8 Country
//  9 Zip
// 10 Default Address Phone
// 11 Phone

/// Every output row has exactly this many fields.
pub const EXPECTED_COLS: usize = 12;

/// Exact-match token used to locate the Country field in a shifted row.
/// The export is GB-only, so this doubles as the written Country value.
pub const COUNTRY_ANCHOR: &str = "GB";

/// Canonical header row, written to every output file.
pub const HEADERS: [&str; EXPECTED_COLS] = [
    "First Name",
    "Last Name",
    "Email",
    "Default Address Company",
    "Default Address Address1",
    "Default Address Address2",
    "Default Address City",
    "Default Address Province Code",
    "Country",
    "Zip",
    "Default Address Phone",
    "Phone",
];
