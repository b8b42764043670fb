//! Word lists for synthetic records

pub(crate) const FIRST_NAMES: &[&str] = &[
    "James", "Mary", "Robert", "Patricia", "John", "Jennifer", "Michael", "Linda", "David",
    "Elizabeth", "William", "Barbara", "Richard", "Susan", "Joseph", "Jessica", "Thomas", "Sarah",
    "Carlos", "Maria", "Daniel", "Karen", "Matthew", "Nancy", "Anthony", "Lisa", "Mark", "Sandra",
    "Wei", "Priya",
];

pub(crate) const LAST_NAMES: &[&str] = &[
    "Smith", "Johnson", "Williams", "Brown", "Jones", "Garcia", "Miller", "Davis", "Rodriguez",
    "Martinez", "Hernandez", "Lopez", "Gonzalez", "Wilson", "Anderson", "Thomas", "Taylor",
    "Moore", "Jackson", "Martin", "Lee", "Perez", "Thompson", "White", "Harris", "Clark", "Lewis",
    "Nguyen", "Patel", "Kim",
];

pub(crate) const EMAIL_DOMAINS: &[&str] =
    &["example.com", "example.net", "example.org", "mail.example.com"];

pub(crate) const STREET_NAMES: &[&str] = &[
    "Oak", "Maple", "Cedar", "Pine", "Elm", "Willow", "Birch", "Walnut", "Lakeview", "Hillcrest",
    "Sunset", "Meadow", "Park", "River", "Spring",
];

pub(crate) const STREET_SUFFIXES: &[&str] = &["St", "Ave", "Blvd", "Dr", "Ln", "Ct", "Way", "Rd"];

pub(crate) const CITIES: &[&str] = &[
    "Austin", "Round Rock", "Georgetown", "Frisco", "McKinney", "Katy", "Sugar Land", "Plano",
    "Orlando", "Tampa", "Boise", "Meridian", "Mesa", "Chandler", "Gilbert", "Charlotte",
    "Raleigh", "Cary", "Nashville", "Franklin",
];

pub(crate) const STATES: &[&str] = &[
    "Alabama", "Arizona", "California", "Colorado", "Florida", "Georgia", "Idaho", "Illinois",
    "Nevada", "New York", "North Carolina", "Ohio", "Oregon", "Tennessee", "Texas", "Utah",
    "Virginia", "Washington",
];
