use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn range(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }

    /// Index weighted toward the front of the list, so some species dominate.
    fn skewed_index(&mut self, len: usize) -> usize {
        let u = self.next_f64();
        ((u * u) * len as f64) as usize % len
    }
}

struct Site {
    habitat: &'static str,
    admin_unit: &'static str,
    plots: &'static [&'static str],
    species: &'static [(&'static str, &'static str)],
    temperature: (f64, f64),
    humidity: (f64, f64),
    rows_per_year: usize,
}

const FOREST: Site = Site {
    habitat: "FOREST",
    admin_unit: "ANTI",
    plots: &["ANTI-0036", "ANTI-0037", "ANTI-0038"],
    species: &[
        ("Red-eyed Vireo", "Vireo olivaceus"),
        ("Ovenbird", "Seiurus aurocapilla"),
        ("Wood Thrush", "Hylocichla mustelina"),
        ("Northern Cardinal", "Cardinalis cardinalis"),
        ("Eastern Wood-Pewee", "Contopus virens"),
        ("Carolina Wren", "Thryothorus ludovicianus"),
        ("Scarlet Tanager", "Piranga olivacea"),
        ("Tufted Titmouse", "Baeolophus bicolor"),
        ("Acadian Flycatcher", "Empidonax virescens"),
        ("Pileated Woodpecker", "Dryocopus pileatus"),
        ("Blue-gray Gnatcatcher", "Polioptila caerulea"),
        ("Worm-eating Warbler", "Helmitheros vermivorum"),
    ],
    temperature: (14.0, 26.0),
    humidity: (60.0, 95.0),
    rows_per_year: 120,
};

const GRASSLAND: Site = Site {
    habitat: "GRASSLAND",
    admin_unit: "MONO",
    plots: &["MONO-0101", "MONO-0102"],
    species: &[
        ("Field Sparrow", "Spizella pusilla"),
        ("Indigo Bunting", "Passerina cyanea"),
        ("Eastern Meadowlark", "Sturnella magna"),
        ("Grasshopper Sparrow", "Ammodramus savannarum"),
        ("Red-winged Blackbird", "Agelaius phoeniceus"),
        ("Eastern Bluebird", "Sialia sialis"),
        ("Bobolink", "Dolichonyx oryzivorus"),
        ("Common Yellowthroat", "Geothlypis trichas"),
        ("Song Sparrow", "Melospiza melodia"),
        ("Barn Swallow", "Hirundo rustica"),
        ("Killdeer", "Charadrius vociferus"),
    ],
    temperature: (18.0, 33.0),
    humidity: (40.0, 80.0),
    rows_per_year: 90,
};

const YEARS: [i64; 3] = [2018, 2019, 2020];

fn build_batch(site: &Site, rng: &mut SimpleRng) -> Result<RecordBatch> {
    let mut admin = Vec::new();
    let mut plot = Vec::new();
    let mut year = Vec::new();
    let mut date = Vec::new();
    let mut common = Vec::new();
    let mut scientific = Vec::new();
    let mut temperature = Vec::new();
    let mut humidity = Vec::new();
    let mut count = Vec::new();

    for &y in &YEARS {
        for row in 0..site.rows_per_year {
            let (name, sci) = site.species[rng.skewed_index(site.species.len())];
            admin.push(site.admin_unit);
            plot.push(site.plots[row % site.plots.len()]);
            year.push(y);
            date.push(format!("{y}-{:02}-{:02}", 5 + row % 3, 1 + row % 28));
            common.push(name);
            scientific.push(sci);
            temperature.push((rng.range(site.temperature.0, site.temperature.1) * 10.0).round() / 10.0);
            humidity.push(rng.range(site.humidity.0, site.humidity.1).round());
            count.push(1 + rng.skewed_index(4) as i64);
        }
    }

    let schema = Arc::new(Schema::new(vec![
        Field::new("Admin_Unit_Code", DataType::Utf8, false),
        Field::new("Plot_Name", DataType::Utf8, false),
        Field::new("Year", DataType::Int64, false),
        Field::new("Date", DataType::Utf8, false),
        Field::new("Common_Name", DataType::Utf8, false),
        Field::new("Scientific_Name", DataType::Utf8, false),
        Field::new("Temperature", DataType::Float64, true),
        Field::new("Humidity", DataType::Float64, true),
        Field::new("Initial_Three_Min_Cnt", DataType::Int64, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(admin)),
        Arc::new(StringArray::from(plot)),
        Arc::new(Int64Array::from(year)),
        Arc::new(StringArray::from_iter_values(date)),
        Arc::new(StringArray::from(common)),
        Arc::new(StringArray::from(scientific)),
        Arc::new(Float64Array::from(temperature)),
        Arc::new(Float64Array::from(humidity)),
        Arc::new(Int64Array::from(count)),
    ];

    RecordBatch::try_new(schema, columns).context("building record batch")
}

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);

    for site in [&FOREST, &GRASSLAND] {
        let batch = build_batch(site, &mut rng)?;
        let output_path = format!("Bird_Monitoring_Data_{}.parquet", site.habitat);

        let file = std::fs::File::create(&output_path)
            .with_context(|| format!("creating {output_path}"))?;
        let mut writer =
            ArrowWriter::try_new(file, batch.schema(), None).context("creating parquet writer")?;
        writer.write(&batch).context("writing batch")?;
        writer.close().context("closing parquet writer")?;

        println!("Wrote {} observations to {output_path}", batch.num_rows());
    }

    println!(
        "Point the dashboard at them with BIRD_WATCH_FOREST=Bird_Monitoring_Data_FOREST.parquet \
         BIRD_WATCH_GRASSLAND=Bird_Monitoring_Data_GRASSLAND.parquet"
    );
    Ok(())
}
