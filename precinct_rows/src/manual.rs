/*!

This is the long-form manual for `precinct_rows` and `precinct-results`.

## Output format

All the counties are written to the same CSV file layout, one row per
precinct, contest, candidate and vote mode:

| column               | content                                                        |
|----------------------|----------------------------------------------------------------|
| `election`           | the election, e.g. `2024 GENERAL`                              |
| `state`              | e.g. `PENNSYLVANIA`                                            |
| `county`             | e.g. `DAUPHIN COUNTY`                                          |
| `precinct`           | the precinct name as printed in the report                     |
| `office`             | the contest, as printed in the report                          |
| `candidate`          | the candidate name                                             |
| `party`              | the party abbreviation, when the report or a lookup has it     |
| `vote_mode`          | `Election Day`, `Mail`, `Provisional`, `Machine`, `Total`, ... |
| `votes`              | an integer                                                     |
| `writein`            | `yes` or `no`                                                  |
| `result_status`      | `OFFICIAL`, `UNOFFICIAL`, `PRELIMINARY`                        |
| `source_url`         | where the report was downloaded from                           |
| `source_filename`    | the file the row was read from                                 |
| `datetime_retrieved` | when the report was downloaded                                 |

Office and party names are not canonicalized across counties.

## Input formats

The following county reports are supported:
* `cumberland` text dump of the precinct results report
* `dauphin` text dump with the source URL of each section
* `lehigh` CSV export of the county results site
* `montgomery` statement of votes cast (PDF)
* `carbon` statement of votes cast, already split per contest (PDF)
* `wayne` precinct canvass (PDF), split per contest only

### `cumberland`

The text is cleaned first: report headers are dropped, the page footer is
replaced by a page break marker and thousands separators are removed. After a
page break, the next line is the precinct. Lines in capitals are office
titles. A result line reads `PARTY CANDIDATE NAME TOTAL ELECTION_DAY MAIL PROVISIONAL`.

### `dauphin`

A result line reads `CANDIDATE NAME MACHINE MAIL-IN PROVISIONAL TOTAL`. The
party is looked up from the candidate name.

### `lehigh`

Five columns: precinct, contest, candidate (prefixed by a three letter party
code), votes, turnout.

### `montgomery` and `carbon`

The report is split into one PDF per contest. The ruled tables of each page
are extracted by a lattice table extractor and exported as one CSV (or xlsx)
file per table:

```text
tables/
  PRESIDENTIAL_ELECTORS/
    page_1_table_1.csv
    page_2_table_1.csv
```

The tables are then turned into long format per contest, and finally into the
output rows.

*/
