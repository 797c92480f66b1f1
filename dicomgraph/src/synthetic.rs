/*
 * Copyright © 2024 Volodymyr Kadzhaia
 * Copyright © 2024 Pieter Bonte
 * KU Leuven — Stream Intelligence Lab, Belgium
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this file,
 * you can obtain one at https://mozilla.org/MPL/2.0/.
 */

//! Demo records for seeding an empty store.

use crate::record::MetadataRecord;
use chrono::NaiveDate;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

pub const MODALITIES: [&str; 5] = ["CT", "MR", "RTSTRUCT", "RTPLAN", "RTDOSE"];

const BODY_PARTS: &[&str] = &["THYROID", "HEAD", "CHEST", "ABDOMEN", "PELVIS"];
const MANUFACTURERS: &[(&str, &str)] = &[
    ("SIEMENS", "SOMATOM Force"),
    ("GE MEDICAL SYSTEMS", "Revolution CT"),
    ("Philips", "Ingenia"),
    ("Varian Medical Systems", "Eclipse"),
];
const REASONS: &[&str] = &["Staging", "Follow-up", "Treatment planning", "Suspected nodule"];

/// Record `i` carries patient `PAT_{1000+i}`, accession `ACC_{5000+i}`, a
/// 2023 study date and the `i`-th modality in rotation. The optional fields
/// are drawn from `seed`, so equal seeds give equal records.
pub fn generate(count: usize, seed: u64) -> Vec<MetadataRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|i| synthetic_record(i, &mut rng)).collect()
}

fn synthetic_record(i: usize, rng: &mut StdRng) -> MetadataRecord {
    let patient_id = format!("PAT_{}", 1000 + i);
    let modality = MODALITIES[i % MODALITIES.len()];
    let study_date = NaiveDate::from_ymd_opt(2023, (i % 12) as u32 + 1, (i % 28) as u32 + 1)
        .map(|date| date.format("%Y%m%d").to_string())
        .unwrap_or_else(|| "20230101".to_string());

    let mut record = MetadataRecord::new()
        .with("Patient ID", patient_id.as_str())
        .with("Study Date", study_date)
        .with("Modality", modality)
        .with("Accession Number", format!("ACC_{}", 5000 + i))
        .with("Patient's Name", format!("Anonymized^{}", patient_id))
        .with("Study Description", format!("Study for {}", modality));

    let sex = if rng.gen_bool(0.5) { "F" } else { "M" };
    record.insert("Patient's Sex", sex);
    record.insert("Patient's Age", format!("{:03}Y", rng.gen_range(18..90)));
    if let Some(body_part) = BODY_PARTS.choose(rng) {
        record.insert("Body Part Examined", *body_part);
    }
    if let Some((manufacturer, model)) = MANUFACTURERS.choose(rng) {
        record.insert("Manufacturer", *manufacturer);
        record.insert("Manufacturer's Model Name", *model);
    }
    if rng.gen_bool(0.3) {
        if let Some(reason) = REASONS.choose(rng) {
            record.insert("Reason for Study", *reason);
        }
    }
    if modality == "CT" {
        record.insert("Slice Thickness", f64::from(rng.gen_range(1..=5u8)) * 0.5);
        record.insert("KVP", 120i64);
    }
    record.insert("Study Time", format!("{:02}{:02}00", rng.gen_range(7..19), rng.gen_range(0..60)));
    record
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;

    #[test]
    fn test_fixed_fields() {
        let records = generate(7, 1);
        assert_eq!(records.len(), 7);
        assert_eq!(records[0].get("Patient ID"), Some(&FieldValue::from("PAT_1000")));
        assert_eq!(records[0].get("Study Date"), Some(&FieldValue::from("20230101")));
        assert_eq!(records[6].get("Accession Number"), Some(&FieldValue::from("ACC_5006")));
        assert_eq!(records[6].get("Study Date"), Some(&FieldValue::from("20230707")));
        assert_eq!(records[5].get("Modality"), Some(&FieldValue::from("CT")));
        assert_eq!(records[4].get("Modality"), Some(&FieldValue::from("RTDOSE")));
    }

    #[test]
    fn test_same_seed_same_records() {
        assert_eq!(generate(20, 42), generate(20, 42));
    }
}
