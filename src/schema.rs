/// Column-name constants for harvester certification tables.
/// Single source of truth for CSV headers - exported to Python via PyO3.
///
/// Header names follow the dashboard's established CSV layout so that
/// previously exported files load unchanged.

// ── Worker identity columns ─────────────────────────────────────────────────
pub mod worker {
    pub const WORKER_ID: &str = "ID_Pekerja";
    pub const NAME: &str = "Nama_Pekerja";
    pub const ESTATE: &str = "Estate";
    pub const CERTIFICATION_DATE: &str = "Tanggal_Sertifikasi";
    pub const CERTIFICATION_LEVEL: &str = "Tingkat_Sertifikasi";
    pub const YEARS_OF_SERVICE: &str = "Lama_Bekerja_tahun";
    pub const AGE: &str = "Usia";
}

// ── Measurements before certification ───────────────────────────────────────
pub mod before {
    pub const TONNAGE_KG: &str = "Tonase_Sebelum_kg_per_hari";
    pub const TREES: &str = "Jumlah_Pokok_Sebelum";
    pub const LOOSE_LOSS_PCT: &str = "Brondolan_Loss_Sebelum_pct";
    pub const UNRIPE_PCT: &str = "Buah_Mentah_Sebelum_pct";
    pub const ROTTEN_PCT: &str = "Buah_Busuk_Sebelum_pct";
    pub const LONG_STALK_PCT: &str = "Gagang_Panjang_Sebelum_pct";
    pub const DAYS_WORKED: &str = "Hari_Kerja_Sebelum";
}

// ── Measurements after certification ───────────────────────────────────────
pub mod after {
    pub const TONNAGE_KG: &str = "Tonase_Sesudah_kg_per_hari";
    pub const TREES: &str = "Jumlah_Pokok_Sesudah";
    pub const LOOSE_LOSS_PCT: &str = "Brondolan_Loss_Sesudah_pct";
    pub const UNRIPE_PCT: &str = "Buah_Mentah_Sesudah_pct";
    pub const ROTTEN_PCT: &str = "Buah_Busuk_Sesudah_pct";
    pub const LONG_STALK_PCT: &str = "Gagang_Panjang_Sesudah_pct";
    pub const DAYS_WORKED: &str = "Hari_Kerja_Sesudah";
}

// ── Compensation columns ────────────────────────────────────────────────────
pub mod compensation {
    pub const BASE_WAGE: &str = "Upah_Dasar_per_hari";
    pub const PREMIUM_PER_KG: &str = "Premi_per_kg";
}

// ── Derived columns (computed, never input) ─────────────────────────────────
pub mod derived {
    pub const TONNAGE_IMPROVEMENT_PCT: &str = "Peningkatan_Tonase_pct";
    pub const TREE_IMPROVEMENT: &str = "Peningkatan_Produktivitas_pokok";
    pub const LOSS_REDUCTION_PCT: &str = "Penurunan_Loss_pct";
    pub const QUALITY_SCORE_BEFORE: &str = "Kualitas_Score_Sebelum";
    pub const QUALITY_SCORE_AFTER: &str = "Kualitas_Score_Sesudah";
    pub const INCOME_BEFORE: &str = "Pendapatan_Sebelum";
    pub const INCOME_AFTER: &str = "Pendapatan_Sesudah";
    pub const INCOME_IMPROVEMENT: &str = "Peningkatan_Pendapatan";

    pub const ALL: [&str; 8] = [
        TONNAGE_IMPROVEMENT_PCT,
        TREE_IMPROVEMENT,
        LOSS_REDUCTION_PCT,
        QUALITY_SCORE_BEFORE,
        QUALITY_SCORE_AFTER,
        INCOME_BEFORE,
        INCOME_AFTER,
        INCOME_IMPROVEMENT,
    ];
}

// ── Estate aggregate columns ────────────────────────────────────────────────
pub mod estate {
    pub const ESTATE: &str = "Estate";
    pub const WORKER_COUNT: &str = "Jumlah_Pemanen";
    pub const PRODUCTION_BEFORE_TON: &str = "Produksi_Sebelum_ton";
    pub const PRODUCTION_AFTER_TON: &str = "Produksi_Sesudah_ton";
    pub const PRODUCTION_DELTA_TON: &str = "Peningkatan_ton";
    pub const REVENUE_IMPACT_MILLION: &str = "Revenue_Impact_juta";
    pub const AVG_QUALITY_BEFORE: &str = "Avg_Quality_Before";
    pub const AVG_QUALITY_AFTER: &str = "Avg_Quality_After";

    pub const ALL: [&str; 8] = [
        ESTATE,
        WORKER_COUNT,
        PRODUCTION_BEFORE_TON,
        PRODUCTION_AFTER_TON,
        PRODUCTION_DELTA_TON,
        REVENUE_IMPACT_MILLION,
        AVG_QUALITY_BEFORE,
        AVG_QUALITY_AFTER,
    ];
}

// ── Certification level values ──────────────────────────────────────────────
pub mod certification {
    pub const BASIC: &str = "Dasar";
    pub const INTERMEDIATE: &str = "Madya";
    pub const ADVANCED: &str = "Mahir";
}

/// Raw worker columns in file order.
pub const RAW_COLUMNS: [&str; 23] = [
    worker::WORKER_ID,
    worker::NAME,
    worker::ESTATE,
    worker::CERTIFICATION_DATE,
    before::TONNAGE_KG,
    before::TREES,
    before::LOOSE_LOSS_PCT,
    before::UNRIPE_PCT,
    before::ROTTEN_PCT,
    before::LONG_STALK_PCT,
    before::DAYS_WORKED,
    after::TONNAGE_KG,
    after::TREES,
    after::LOOSE_LOSS_PCT,
    after::UNRIPE_PCT,
    after::ROTTEN_PCT,
    after::LONG_STALK_PCT,
    after::DAYS_WORKED,
    compensation::BASE_WAGE,
    compensation::PREMIUM_PER_KG,
    worker::YEARS_OF_SERVICE,
    worker::AGE,
    worker::CERTIFICATION_LEVEL,
];

/// Date format used for the certification date column.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
