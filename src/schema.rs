table! {
    players (id) {
        id -> Int8,
        name -> Varchar,
        skill_level -> Int2,
        gender -> Varchar,
        family -> Varchar,
        rank -> Int4,
        team_id -> Nullable<Int8>,
        created_at -> Timestamptz,
        updated_at -> Nullable<Timestamptz>,
    }
}

table! {
    teams (id) {
        id -> Int8,
        name -> Varchar,
        color -> Varchar,
        icon_name -> Varchar,
        player_ids -> Array<Int8>,
        rank -> Int4,
        created_at -> Timestamptz,
        updated_at -> Nullable<Timestamptz>,
    }
}

joinable!(players -> teams (team_id));

allow_tables_to_appear_in_same_query!(
    players,
    teams,
);
