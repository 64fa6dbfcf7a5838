use quarry::{BelongsTo, HasMany, HasOne, HasOneThrough, Model, Record};

#[derive(Clone, Debug, Default)]
pub struct User {
    record: Record,
}

impl Model for User {
    const TABLE: &'static str = "users";
    const FILLABLE: &'static [&'static str] = &["name", "email"];

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn from_record(record: Record) -> Self {
        Self { record }
    }
}

impl User {
    pub fn posts() -> HasMany<User, Post> {
        Self::has_many("user_id")
    }

    pub fn profile() -> HasOne<User, Profile> {
        Self::has_one("user_id")
    }
}

#[derive(Clone, Debug, Default)]
pub struct Post {
    record: Record,
}

impl Model for Post {
    const TABLE: &'static str = "posts";

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn from_record(record: Record) -> Self {
        Self { record }
    }
}

impl Post {
    pub fn author() -> BelongsTo<Post, User> {
        Self::belongs_to("user_id")
    }
}

#[derive(Clone, Debug, Default)]
pub struct Profile {
    record: Record,
}

impl Model for Profile {
    const TABLE: &'static str = "profiles";
    const TIMESTAMPS: bool = false;

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn from_record(record: Record) -> Self {
        Self { record }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Mechanic {
    record: Record,
}

impl Model for Mechanic {
    const TABLE: &'static str = "mechanics";
    const TIMESTAMPS: bool = false;

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn from_record(record: Record) -> Self {
        Self { record }
    }
}

impl Mechanic {
    /// The insurance of the car this mechanic services, reached through the
    /// cars table.
    pub fn insurance() -> HasOneThrough<Mechanic, Car, Insurance> {
        Self::has_one_through("mechanic_id", "car_id")
    }
}

#[derive(Clone, Debug, Default)]
pub struct Car {
    record: Record,
}

impl Model for Car {
    const TABLE: &'static str = "cars";
    const TIMESTAMPS: bool = false;

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn from_record(record: Record) -> Self {
        Self { record }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Insurance {
    record: Record,
}

impl Model for Insurance {
    const TABLE: &'static str = "insurances";
    const TIMESTAMPS: bool = false;

    fn record(&self) -> &Record {
        &self.record
    }

    fn record_mut(&mut self) -> &mut Record {
        &mut self.record
    }

    fn from_record(record: Record) -> Self {
        Self { record }
    }
}
