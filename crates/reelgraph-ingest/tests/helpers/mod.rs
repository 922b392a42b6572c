//! Shared fixtures for the import integration tests
//!
//! A tiny but complete data directory: two titles, two people, one line of
//! every other dump, and a two-movie dataset where the first movie matches
//! an existing title and the second does not.

#![allow(dead_code)]

use std::fs;
use std::path::Path;

pub const TITLE_BASICS: &str = "\
tconst\ttitleType\tprimaryTitle\toriginalTitle\tisAdult\tstartYear\tendYear\truntimeMinutes\tgenres
tt2015381\tmovie\tGuardians of the Galaxy\tGuardians of the Galaxy\t0\t2014\t\\N\t121\tAction,Adventure
tt0000002\tshort\tLe clown et ses chiens\tLe clown et ses chiens\t0\t1892\t\\N\t5\t\\N
";

pub const NAME_BASICS: &str = "\
nconst\tprimaryName\tbirthYear\tdeathYear\tprimaryProfession\tknownForTitles
nm0000001\tJames Gunn\t1966\t\\N\twriter,director,producer,actor\ttt2015381
nm0000002\tVin Diesel\t1967\t\\N\tactor,producer\ttt2015381
";

pub const TITLE_CREW: &str = "\
tconst\tdirectors\twriters
tt2015381\tnm0000001\tnm0000001
";

pub const TITLE_EPISODE: &str = "\
tconst\tparentTconst\tseasonNumber\tepisodeNumber
tt0000003\ttt0000002\t1\t1
";

pub const TITLE_AKAS: &str = "\
titleId\tordering\ttitle\tregion\tlanguage\ttypes\tattributes\tisOriginalTitle
tt2015381\t1\tLes Gardiens de la Galaxie\tFR\tfr\timdbDisplay\t\\N\t0
";

pub const TITLE_PRINCIPALS: &str = "\
tconst\tordering\tnconst\tcategory\tjob\tcharacters
tt2015381\t1\tnm0000002\tactor\t\\N\t[\"Groot\"]
";

pub const TITLE_RATINGS: &str = "\
tconst\taverageRating\tnumVotes
tt2015381\t8.0\t1000000
";

pub const MOVIES: &str = "\
Rank,Title,Genre,Description,Director,Actors,Year,Runtime (Minutes),Rating,Votes,Revenue (Millions),Metascore
1,Guardians of the Galaxy,\"Action,Adventure,Sci-Fi\",A group of intergalactic criminals are forced to work together.,James Gunn,\"Chris Pratt, Vin Diesel, Bradley Cooper\",2014,121,8.1,757074,333.13,76
2,Prometheus,\"Adventure,Mystery,Sci-Fi\",\"Following clues to the origin of mankind, a team finds a structure on a distant moon.\",Ridley Scott,\"Noomi Rapace, Vin Diesel\",2012,124,7.0,485820,126.46,65
";

pub const MOVIES_FILE: &str = "IMDB-Movie-Data.csv";

/// Write every dump plus the movie dataset into `dir`
pub fn write_dataset(dir: &Path) {
    let files = [
        ("title.basics.tsv", TITLE_BASICS),
        ("name.basics.tsv", NAME_BASICS),
        ("title.crew.tsv", TITLE_CREW),
        ("title.episode.tsv", TITLE_EPISODE),
        ("title.akas.tsv", TITLE_AKAS),
        ("title.principals.tsv", TITLE_PRINCIPALS),
        ("title.ratings.tsv", TITLE_RATINGS),
        (MOVIES_FILE, MOVIES),
    ];
    for (name, contents) in files {
        fs::write(dir.join(name), contents).unwrap_or_else(|e| panic!("writing {name}: {e}"));
    }
}
